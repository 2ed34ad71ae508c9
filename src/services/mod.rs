pub mod certificate_service;
pub mod email_service;
pub mod grading_service;
pub mod profile_service;
pub mod question_service;
pub mod quiz_service;
pub mod score_service;
