pub mod progress_dto;
pub mod question_dto;
pub mod tool_dto;
pub mod user_dto;
