pub mod crons;
pub mod jobs;
