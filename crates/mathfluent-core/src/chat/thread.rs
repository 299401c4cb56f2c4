/// Id of the direct-message thread between two users.
///
/// Both participants resolve to the same id no matter who opens the thread.
pub fn direct_thread_id(user_a: &str, user_b: &str) -> String {
    let mut pair = [user_a, user_b];
    pair.sort_unstable();
    pair.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        assert_eq!(direct_thread_id("u1", "u2"), direct_thread_id("u2", "u1"));
        assert_eq!(direct_thread_id("u2", "u1"), "u1_u2");
    }

    #[test]
    fn test_self_thread() {
        assert_eq!(direct_thread_id("bob", "bob"), "bob_bob");
    }
}
