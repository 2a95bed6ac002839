use uuid::Uuid;

/// Ids are opaque strings throughout the API: clients may supply their own,
/// and we mint v4 uuids when they don't.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
