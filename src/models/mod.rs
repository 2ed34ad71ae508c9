pub mod answer;
pub mod certificate;
pub mod leaderboard;
pub mod outcome;
pub mod question;
pub mod quiz_session;
