pub mod certificate_dto;
pub mod quiz_dto;
