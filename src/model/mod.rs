pub mod api_log;
pub mod bet;
pub mod league;
pub mod matches;
pub mod payload;
pub mod response;
pub mod schema;
pub mod team;
pub mod tournament;
pub mod user;
