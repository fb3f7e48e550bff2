use super::*;

/// Fills a board with pairs of cards drawn from `symbols`, shuffled with a seeded RNG.
///
/// Symbols are reused when there are more pairs than symbols. Without any symbols, pairs are
/// labelled `P0`, `P1`, and so on. On a board with an odd number of cells the leftover card is
/// one that appears nowhere else: the next unused symbol, or the first free `P{n}` label.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPairsGenerator {
    seed: u64,
    symbols: Vec<Card>,
}

impl RandomPairsGenerator {
    pub fn new(seed: u64, symbols: Vec<Card>) -> Self {
        Self { seed, symbols }
    }

    pub fn numbered(seed: u64) -> Self {
        Self::new(seed, Vec::new())
    }

    fn symbol(&self, pair: CellCount) -> Result<Card> {
        if self.symbols.is_empty() {
            Card::new(format!("P{pair}"))
        } else {
            Ok(self.symbols[pair as usize % self.symbols.len()].clone())
        }
    }

    fn leftover(&self, pairs: CellCount) -> Result<Card> {
        let used = &self.symbols[..(pairs as usize).min(self.symbols.len())];
        if let Some(card) = self.symbols[used.len()..]
            .iter()
            .find(|card| !used.contains(card))
        {
            return Ok(card.clone());
        }

        let mut label = pairs;
        loop {
            let card = Card::new(format!("P{label}"))?;
            if !self.symbols.contains(&card) {
                return Ok(card);
            }
            label += 1;
        }
    }
}

impl LayoutGenerator for RandomPairsGenerator {
    fn generate(self, config: GameConfig) -> Result<Layout> {
        use rand::prelude::*;

        let total_cells = config.total_cells();
        let pairs = config.pair_count();

        if !self.symbols.is_empty() && (self.symbols.len() as CellCount) < pairs {
            log::warn!(
                "Only {} symbols for {} pairs, symbols will repeat",
                self.symbols.len(),
                pairs
            );
        }

        let mut cards = Vec::with_capacity(total_cells as usize);
        for pair in 0..pairs {
            let card = self.symbol(pair)?;
            cards.push(card.clone());
            cards.push(card);
        }

        if total_cells % 2 == 1 {
            log::warn!("Odd number of cells ({total_cells}), one card will have no partner");
            cards.push(self.leftover(pairs)?);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        cards.shuffle(&mut rng);

        Layout::from_cards(config.size, cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(tokens: &[&str]) -> Vec<Card> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn counts(layout: &Layout) -> std::collections::BTreeMap<&str, usize> {
        let mut counts = std::collections::BTreeMap::new();
        for card in layout.iter() {
            *counts.entry(card.as_str()).or_default() += 1;
        }
        counts
    }

    #[test]
    fn every_card_has_a_partner() {
        let layout = RandomPairsGenerator::new(7, symbols(&["🍎", "🍌", "🍒"]))
            .generate(GameConfig::new((2, 3)))
            .unwrap();

        assert_eq!(layout.size(), (2, 3));
        assert_eq!(
            counts(&layout).into_iter().collect::<Vec<_>>(),
            [("🍌", 2), ("🍎", 2), ("🍒", 2)]
        );
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::new((4, 4));

        let a = RandomPairsGenerator::numbered(42).generate(config).unwrap();
        let b = RandomPairsGenerator::numbered(42).generate(config).unwrap();

        assert_eq!(a, b);
        assert_eq!(counts(&a).len(), 8);
    }

    #[test]
    fn odd_board_leaves_one_single() {
        let layout = RandomPairsGenerator::numbered(1)
            .generate(GameConfig::new((3, 3)))
            .unwrap();

        let counts = counts(&layout);
        assert_eq!(counts.values().filter(|&&n| n == 1).count(), 1);
        assert_eq!(counts.values().sum::<usize>(), 9);
    }

    #[test]
    fn odd_board_single_is_a_fresh_symbol() {
        let layout = RandomPairsGenerator::new(1, symbols(&["X", "Y"]))
            .generate(GameConfig::new((1, 5)))
            .unwrap();

        assert_eq!(
            counts(&layout).into_iter().collect::<Vec<_>>(),
            [("P2", 1), ("X", 2), ("Y", 2)]
        );
    }

    #[test]
    fn odd_board_single_prefers_unused_symbols() {
        let layout = RandomPairsGenerator::new(9, symbols(&["X", "X", "P1", "Z"]))
            .generate(GameConfig::new((1, 3)))
            .unwrap();

        assert_eq!(
            counts(&layout).into_iter().collect::<Vec<_>>(),
            [("P1", 1), ("X", 2)]
        );
    }

    #[test]
    fn odd_board_single_label_avoids_symbols() {
        let layout = RandomPairsGenerator::new(4, symbols(&["P1"]))
            .generate(GameConfig::new((1, 3)))
            .unwrap();

        assert_eq!(
            counts(&layout).into_iter().collect::<Vec<_>>(),
            [("P1", 2), ("P2", 1)]
        );
    }

    #[test]
    fn symbols_repeat_when_short() {
        let layout = RandomPairsGenerator::new(3, symbols(&["X"]))
            .generate(GameConfig::new((2, 2)))
            .unwrap();

        assert_eq!(counts(&layout).get("X"), Some(&4));
    }

    #[test]
    fn zero_sized_config_is_rejected() {
        let result = RandomPairsGenerator::numbered(0).generate(GameConfig::new_unchecked((0, 4)));
        assert!(matches!(result, Err(GameError::InvalidDimensions { .. })));
    }
}
