//! The CDDB/FreeDB text protocol.
//!
//! # Architecture
//!
//! - **Command** (`command.rs`) - tokenizes the command line into a closed set
//!   of commands and reads the protocol level
//! - **Query** (`query.rs`) - validates QUERY/READ arguments and builds the
//!   parameterized store lookups
//! - **Format** (`format.rs`) - renders store rows and fixed texts as replies
//! - **Response** (`response.rs`) - status lines, bodies, CRLF framing
//! - **Gateway** (`gateway.rs`) - routes one request to one handler
//!
//! # Usage
//!
//! ```ignore
//! use freedb_gateway::cddb::Gateway;
//!
//! let gateway = Gateway::new(store, server_info);
//! let response = gateway.respond(Some("cddb lscat"), Some("6")).await?;
//! print!("{}", response.render());
//! ```

pub mod command;
pub mod format;
pub mod gateway;
pub mod query;
pub mod response;

pub use command::{CddbCommand, Command, ProtocolLevel};
pub use gateway::{Gateway, Request};
pub use response::{ProtocolError, Response, Status};
