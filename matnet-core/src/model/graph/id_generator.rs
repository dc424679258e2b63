/// produces identifiers that are not yet taken. candidates continue from the
/// largest purely numeric id in use, so a network with links "1".."40" receives
/// "41", "42", .. for reindexed links.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn from_existing<'a, I>(ids: I) -> IdGenerator
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = ids
            .into_iter()
            .filter_map(|id| id.parse::<u64>().ok())
            .max();
        IdGenerator {
            next: max.map(|m| m.saturating_add(1)).unwrap_or(0),
        }
    }

    /// returns the next candidate for which `is_taken` is false.
    pub fn next_free<F>(&mut self, is_taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let candidate = self.next.to_string();
            self.next = self.next.saturating_add(1);
            if !is_taken(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IdGenerator;
    use std::collections::HashSet;

    #[test]
    fn test_continues_from_numeric_max() {
        let taken = HashSet::from(["1", "7", "abc"]);
        let mut generator = IdGenerator::from_existing(taken.iter().copied());
        assert_eq!(generator.next_free(|c| taken.contains(c)), "8");
        assert_eq!(generator.next_free(|c| taken.contains(c)), "9");
    }

    #[test]
    fn test_skips_taken_candidates() {
        let taken = HashSet::from(["a", "0", "1"]);
        let mut generator = IdGenerator::from_existing(["a"]);
        assert_eq!(generator.next_free(|c| taken.contains(c)), "2");
    }
}
