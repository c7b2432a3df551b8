pub mod answer;
pub mod question;
pub mod saved_question;
pub mod solved_question;
pub mod topic;
pub mod user;
