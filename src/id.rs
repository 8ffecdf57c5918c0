use uuid::Uuid;

/// Mint a new opaque item id. UUIDv7 keeps ids unique and roughly
/// time-ordered, which makes persisted files easier to eyeball.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}
