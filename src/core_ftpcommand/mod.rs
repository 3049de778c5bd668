// Here's the list of the FTP commands implemented
pub mod cdup;
pub mod cwd;
pub mod feat;
pub mod list;
pub mod noop;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod syst;
pub mod type_;
pub mod user;

// Verb table and dispatch
pub mod ftpcommand;
pub mod handlers;

// The utils and common functions are here
pub mod utils;
