pub mod ai_service;
pub mod candidate_service;
pub mod capture_service;
pub mod export_service;
pub mod extract_service;
pub mod speech_service;
pub mod storage_service;
pub mod summary_service;
pub mod vacancy_service;
