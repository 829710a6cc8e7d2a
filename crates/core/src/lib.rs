pub mod config;
pub mod query;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig,
};
pub use query::{
    build_query, ListQueryExecutor, ListSlice, PaginationEnvelope, QueryDescriptor, QueryError,
    RawListParams, SortOrder, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
pub use ticket::{
    Comment, CreateCommentRequest, CreateTicketRequest, SqliteTicketStore, Ticket, TicketError,
    TicketPriority, TicketStatus, TicketStore, UpdateTicketRequest,
};
