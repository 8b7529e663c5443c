//! The key registry: which document paths get published, and as what type.
//!
//! The registry is a single declarative table mapping each publishable
//! dot-path to a type descriptor. It is static and hand-maintained; a path
//! missing from the table is silently never published, and a path present in
//! the table but absent from the document publishes the type's zero value.

/// Semantic type of a published configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Stored as a plain string value.
    String,
    /// Stored as a string-encoded integer.
    Int,
    /// Stored as integer 1 (true) or 0 (false); there is no boolean wire type.
    Bool,
    /// Stored as a set of string members. Ordering is not preserved.
    StringList,
}

/// One publishable key: a dot-path into the document plus its type.
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    /// Dot-separated path, identical in the document and in the store.
    pub path: &'static str,
    /// The semantic type used for both the document read and the store write.
    pub kind: ValueKind,
}

const fn key(path: &'static str, kind: ValueKind) -> KeySpec {
    KeySpec { path, kind }
}

/// Every configuration path eligible for publication.
///
/// Must stay in sync with the schema of `twitch-bot.yaml` by hand; nothing
/// validates the two against each other.
pub const REGISTRY: &[KeySpec] = &[
    key("jaeger.uri", ValueKind::String),
    key("jaeger.service", ValueKind::String),
    key("jaeger.environment", ValueKind::String),
    key("jaeger.id", ValueKind::Int),
    key("irc.target", ValueKind::String),
    key("irc.nickname", ValueKind::String),
    key("irc.password", ValueKind::String),
    key("irc.ssl", ValueKind::Bool),
    key("irc.channels", ValueKind::StringList),
    // mqtt.port is published as a string on purpose; the bot parses it.
    key("mqtt.broker", ValueKind::String),
    key("mqtt.port", ValueKind::String),
    key("mqtt.client_id", ValueKind::String),
    key("redis.uri", ValueKind::String),
    key("redis.password", ValueKind::String),
    key("redis.port", ValueKind::Int),
    key("redis.database", ValueKind::Int),
    key("prometheus.port", ValueKind::Int),
    key("log.level", ValueKind::String),
    key("log.path", ValueKind::String),
    key("triggers.guestbook.topic", ValueKind::String),
    key("triggers.bot.owner", ValueKind::String),
    key("triggers.bot.repository", ValueKind::String),
    key("triggers.socialmedia.github", ValueKind::String),
    key("triggers.socialmedia.twitter", ValueKind::String),
    key("triggers.socialmedia.youtube", ValueKind::String),
    key("triggers.streamholics.friends", ValueKind::StringList),
];

/// Iterate over the registry entries of one kind.
pub fn keys_of(kind: ValueKind) -> impl Iterator<Item = &'static KeySpec> {
    REGISTRY.iter().filter(move |spec| spec.kind == kind)
}

/// Look up the registry entry for a path, if the path is publishable.
pub fn lookup(path: &str) -> Option<&'static KeySpec> {
    REGISTRY.iter().find(|spec| spec.path == path)
}
