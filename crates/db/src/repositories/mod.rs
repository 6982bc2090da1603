pub mod device_document_repo;

pub use device_document_repo::DeviceDocumentRepo;
