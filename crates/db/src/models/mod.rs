pub mod device_document;
