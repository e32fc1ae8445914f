//! Request dispatch.
//!
//! Each request is parsed into an immutable [`Request`], routed to exactly
//! one handler and answered with a [`Response`]. Nothing survives between
//! requests; the only shared pieces are the store handle and the server
//! identity, both fixed at construction.

use super::command::{CddbCommand, Command, ProtocolLevel};
use super::format::{self, ServerInfo};
use super::query::{DiscQuery, parse_disc_ref};
use super::response::{ProtocolError, Response, Status};
use crate::store::{MetadataStore, StoreError};

/// One parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub proto: ProtocolLevel,
}

impl Request {
    /// Build a request from the raw `cmd` and `proto` parameters.
    ///
    /// Both are required; an empty value counts as missing.
    pub fn parse(cmd: Option<&str>, proto: Option<&str>) -> Result<Self, ProtocolError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        let (Some(cmd), Some(proto)) = (present(cmd), present(proto)) else {
            return Err(ProtocolError::MissingArguments);
        };

        Ok(Self {
            command: Command::parse(cmd)?,
            proto: ProtocolLevel::parse(proto),
        })
    }
}

/// Why a handler did not produce a response itself.
#[derive(Debug)]
enum HandlerError {
    Protocol(ProtocolError),
    Store(StoreError),
}

impl From<ProtocolError> for HandlerError {
    fn from(err: ProtocolError) -> Self {
        HandlerError::Protocol(err)
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        HandlerError::Store(err)
    }
}

/// The CDDB front end over a metadata store.
#[derive(Debug)]
pub struct Gateway<S> {
    store: S,
    server: ServerInfo,
}

impl<S: MetadataStore> Gateway<S> {
    pub fn new(store: S, server: ServerInfo) -> Self {
        Self { store, server }
    }

    /// Answer one request.
    ///
    /// Every outcome is a protocol response except losing the store, which
    /// comes back as [`StoreError::Unavailable`] for the transport to report.
    pub async fn respond(
        &self,
        cmd: Option<&str>,
        proto: Option<&str>,
    ) -> Result<Response, StoreError> {
        let outcome = match Request::parse(cmd, proto) {
            Ok(request) => {
                tracing::debug!(
                    command = request.command.name(),
                    proto = ?request.proto.level(),
                    "Dispatching"
                );
                self.dispatch(&request).await
            }
            Err(err) => Err(err.into()),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(HandlerError::Protocol(err)) => err.into(),
            Err(HandlerError::Store(StoreError::InvalidInput(reason))) => {
                tracing::warn!("Store rejected request {:?}: {}", cmd, reason);
                Response::status(Status::InvalidRequest, "invalid request")
            }
            Err(HandlerError::Store(err)) => {
                tracing::error!("Request {:?} failed: {}", cmd, err);
                return Err(err);
            }
        };

        tracing::debug!("Request cmd={:?} proto={:?}:\n{}", cmd, proto, response.render());
        Ok(response)
    }

    async fn dispatch(&self, request: &Request) -> Result<Response, HandlerError> {
        match &request.command {
            Command::Cddb(command) => self.cddb(command, request.proto).await,
            Command::Sites => Ok(format::sites(&self.server)),
            Command::Motd => Ok(format::motd(self.store.last_replication().await?)),
            Command::Stat => Ok(format::stat(&self.store.stats().await?)),
            Command::Whom => Ok(format::whom()),
            Command::Ver => Ok(format::ver()),
            Command::Help => Ok(format::help()),
            Command::Unknown(token) => Err(ProtocolError::UnknownCommand(token.clone()).into()),
        }
    }

    async fn cddb(
        &self,
        command: &CddbCommand,
        proto: ProtocolLevel,
    ) -> Result<Response, HandlerError> {
        match command {
            CddbCommand::Query(args) => self.query(args).await,
            CddbCommand::Read(args) => self.read(args, proto).await,
            CddbCommand::Lscat => Ok(format::lscat()),
            CddbCommand::Unknown(sub) => Err(ProtocolError::UnknownCommand(sub.clone()).into()),
        }
    }

    async fn query(&self, args: &[String]) -> Result<Response, HandlerError> {
        let plan = DiscQuery::parse(args)?.plan();

        let (exact, fuzzy) = tokio::try_join!(
            self.store.find_by_discid(&plan.exact),
            self.store.find_by_toc(&plan.fuzzy),
        )?;
        tracing::debug!(exact = exact.len(), fuzzy = fuzzy.len(), "Query matches");

        Ok(format::query_matches(&fuzzy, &exact))
    }

    async fn read(&self, args: &[String], proto: ProtocolLevel) -> Result<Response, HandlerError> {
        let disc = parse_disc_ref(args)?;
        let release = self
            .store
            .find_release(disc)
            .await?
            .ok_or(ProtocolError::EntryNotFound)?;

        Ok(format::xmcd_entry(disc, &release, proto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiscRef;
    use crate::store::mocks::{MemoryStore, StoredMedium};
    use crate::test_utils::{sample_medium, sample_query_line, test_gateway};

    async fn respond(gateway: &Gateway<MemoryStore>, cmd: &str, proto: &str) -> String {
        gateway
            .respond(Some(cmd), Some(proto))
            .await
            .expect("store should be reachable")
            .render()
    }

    #[tokio::test]
    async fn test_missing_parameters() {
        let gateway = test_gateway(MemoryStore::default());
        let expected = "500 Command syntax error: incorrect number of arguments.\r\n";

        for (cmd, proto) in [(None, Some("6")), (Some("stat"), None), (Some(""), Some("6"))] {
            let response = gateway.respond(cmd, proto).await.unwrap();
            assert_eq!(response.render(), expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_commands() {
        let gateway = test_gateway(MemoryStore::default());
        let expected = "500 Command syntax error, command unknown, command unimplemented.\r\n";

        assert_eq!(respond(&gateway, "frob", "6").await, expected);
        assert_eq!(respond(&gateway, "CDDB FROB", "6").await, expected);
        assert_eq!(respond(&gateway, "cddb write rock 1", "6").await, expected);
    }

    #[tokio::test]
    async fn test_syntax_errors_never_reach_store() {
        // any store call would fail with Unavailable
        let gateway = test_gateway(MemoryStore::with_error(StoreError::Unavailable(
            "should not be called".into(),
        )));

        assert_eq!(
            respond(&gateway, "cddb query zzzz 1 150 452", "6").await,
            "500 ID not hex.\r\n"
        );
        assert_eq!(
            respond(&gateway, "cddb query b20c3a0d 3 150 452", "6").await,
            "500 Command syntax error.\r\n"
        );
        assert_eq!(
            respond(&gateway, "cddb read misc", "6").await,
            "500 Command syntax error.\r\n"
        );
        assert_eq!(
            respond(&gateway, "cddb read misc xyz", "6").await,
            "500 ID not hex.\r\n"
        );
        assert_eq!(
            respond(&gateway, "cddb read jazz 0000002a", "6").await,
            "401 Specified CDDB entry not found.\r\n"
        );
    }

    #[tokio::test]
    async fn test_query_without_matches() {
        let gateway = test_gateway(MemoryStore::default());
        assert_eq!(
            respond(&gateway, &sample_query_line(), "6").await,
            "202 No match found.\r\n"
        );
    }

    #[tokio::test]
    async fn test_query_lists_both_match_kinds() {
        let gateway = test_gateway(MemoryStore::new(vec![sample_medium()]));
        let body = respond(&gateway, &sample_query_line(), "6").await;

        assert_eq!(
            body,
            "211 Found inexact matches, list follows (until terminating `.')\r\n\
             misc 0000002a Sample Artist / Sample Album\r\n\
             rock b20c3a0d Sample Artist / Sample Album\r\n\
             .\r\n"
        );
    }

    #[tokio::test]
    async fn test_exact_only_match_is_inexact() {
        // Far-off track lengths: only the checksum matches
        let mut medium = sample_medium();
        for track in &mut medium.release.tracks {
            track.length_ms += 60_000;
        }
        let gateway = test_gateway(MemoryStore::new(vec![medium]));
        let body = respond(&gateway, &sample_query_line(), "6").await;

        assert!(body.starts_with("211 "));
        assert!(!body.contains("misc "));
        assert!(body.contains("rock b20c3a0d"));
    }

    #[tokio::test]
    async fn test_query_then_read_misc_round_trip() {
        let gateway = test_gateway(MemoryStore::new(vec![sample_medium()]));
        let query = respond(&gateway, &sample_query_line(), "6").await;

        let misc_line = query
            .lines()
            .find(|line| line.starts_with("misc "))
            .expect("misc match");
        let id = misc_line.split_whitespace().nth(1).unwrap();

        let read = respond(&gateway, &format!("cddb read misc {}", id), "6").await;
        assert!(read.starts_with("210 OK, CDDB database entry follows"));
        assert!(read.contains(&format!("DISCID={}\r\n", id)));
        assert!(read.contains("DTITLE=Sample Artist / Sample Album\r\n"));
        assert!(read.ends_with("PLAYORDER=\r\n.\r\n"));
    }

    #[tokio::test]
    async fn test_read_rock_takes_first_medium() {
        let first = sample_medium();
        let second = StoredMedium {
            id: first.id + 1,
            release: crate::model::ReleaseRecord {
                title: "Other Pressing".to_string(),
                ..first.release.clone()
            },
            ..first.clone()
        };
        let gateway = test_gateway(MemoryStore::new(vec![second, first]));

        let read = respond(&gateway, "cddb read rock B20C3A0D", "6").await;
        assert!(read.contains("DISCID=b20c3a0d\r\n"));
        assert!(read.contains("DTITLE=Sample Artist / Sample Album\r\n"));
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let gateway = test_gateway(MemoryStore::new(vec![sample_medium()]));
        assert_eq!(
            respond(&gateway, "cddb read misc ffff", "6").await,
            "401 Specified CDDB entry not found.\r\n"
        );
    }

    #[tokio::test]
    async fn test_read_protocol_levels() {
        let gateway = test_gateway(MemoryStore::new(vec![sample_medium()]));
        let disc = DiscRef::Medium(sample_medium().id).to_string();

        let modern = respond(&gateway, &format!("cddb read {}", disc), "6").await;
        assert!(modern.contains("DYEAR=1999\r\nDGENRE=Unknown\r\n"));

        let legacy = respond(&gateway, &format!("cddb read {}", disc), "3").await;
        assert!(!legacy.contains("DYEAR="));
        assert!(!legacy.contains("DGENRE="));
    }

    #[tokio::test]
    async fn test_store_input_error_is_invalid_request() {
        let gateway = test_gateway(MemoryStore::with_error(StoreError::InvalidInput(
            "integer out of range".into(),
        )));
        assert_eq!(
            respond(&gateway, &sample_query_line(), "6").await,
            "400 invalid request\r\n"
        );
    }

    #[tokio::test]
    async fn test_store_unavailable_escapes() {
        let gateway = test_gateway(MemoryStore::with_error(StoreError::Unavailable(
            "connection refused".into(),
        )));
        let result = gateway.respond(Some("stat"), Some("6")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        // commands that never touch the store still answer
        assert!(gateway.respond(Some("ver"), Some("6")).await.is_ok());
    }

    #[tokio::test]
    async fn test_informational_commands() {
        let store = MemoryStore::new(vec![sample_medium()]);
        let gateway = test_gateway(store);

        let stat = respond(&gateway, "STAT", "6").await;
        assert!(stat.contains("    rock: 1\r\n"));
        assert!(stat.contains("    misc: 1\r\n"));

        let motd = respond(&gateway, "motd", "6").await;
        assert!(motd.contains("last replicated unknown\r\n"));

        let sites = respond(&gateway, "sites", "6").await;
        assert!(sites.contains("freedb.test http 80 /~cddb/cddb.cgi"));

        assert_eq!(
            respond(&gateway, "whom", "6").await,
            "401 No user information available.\r\n"
        );
        assert!(respond(&gateway, "help", "6").await.ends_with("WHOM\r\n.\r\n"));
        assert!(respond(&gateway, "cddb lscat", "6").await.contains("rock\r\nmisc\r\n"));
    }

    #[test]
    fn test_request_parse() {
        let request = Request::parse(Some("CDDB LSCAT"), Some("5")).unwrap();
        assert_eq!(request.command, Command::Cddb(CddbCommand::Lscat));
        assert!(request.proto.has_year_and_genre());

        assert_eq!(
            Request::parse(Some("cddb"), Some("5")),
            Err(ProtocolError::MissingArguments)
        );
        assert_eq!(
            Request::parse(Some("stat"), Some("")),
            Err(ProtocolError::MissingArguments)
        );
        assert_eq!(
            Request::parse(Some(""), None),
            Err(ProtocolError::MissingArguments)
        );
    }
}
