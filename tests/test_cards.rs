use pineapple_cfr::cards::*;
use pineapple_cfr::dealer::Dealer;
use pineapple_cfr::error::CfrError;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_card_creation() {
    let c = Card::new(Rank::Ace, Suit::Spades);
    assert_eq!(c.rank, Rank::Ace);
    assert_eq!(c.suit, Suit::Spades);
    assert_eq!(c.value(), 14);
}

#[test]
fn test_invalid_rank() {
    assert!(matches!(Rank::from_char('X'), Err(CfrError::InvalidRank('X'))));
}

#[test]
fn test_invalid_suit() {
    assert!(matches!(Suit::from_char('x'), Err(CfrError::InvalidSuit('x'))));
}

#[test]
fn test_card_str() {
    let c = Card::new(Rank::King, Suit::Diamonds);
    assert_eq!(format!("{}", c), "Kd");
}

#[test]
fn test_card_pretty() {
    let c = Card::new(Rank::Ace, Suit::Spades);
    assert_eq!(c.pretty(), "A\u{2660}");
}

#[test]
fn test_card_ordering() {
    let two = Card::new(Rank::Two, Suit::Spades);
    let ace = Card::new(Rank::Ace, Suit::Spades);
    assert!(two < ace);
    let king = Card::new(Rank::King, Suit::Hearts);
    let queen = Card::new(Rank::Queen, Suit::Diamonds);
    assert!(!(king < queen));
}

#[test]
fn test_card_index_matches_deck_position() {
    for (i, card) in FULL_DECK.iter().enumerate() {
        assert_eq!(card.index(), i);
    }
    assert_eq!(FULL_DECK[0].to_string(), "2s");
    assert_eq!(FULL_DECK[51].to_string(), "Ac");
}

#[test]
fn test_parse_card_basic() {
    assert_eq!(parse_card("As").unwrap(), Card::new(Rank::Ace, Suit::Spades));
    assert_eq!(parse_card("Td").unwrap(), Card::new(Rank::Ten, Suit::Diamonds));
}

#[test]
fn test_parse_card_case_insensitive() {
    assert_eq!(parse_card("AH").unwrap(), Card::new(Rank::Ace, Suit::Hearts));
    assert_eq!(parse_card("tc").unwrap(), Card::new(Rank::Ten, Suit::Clubs));
}

#[test]
fn test_parse_card_invalid() {
    assert!(matches!(parse_card("ABC"), Err(CfrError::InvalidCardNotation(_))));
}

#[test]
fn test_parse_board_streets() {
    assert_eq!(parse_board("AsKdQh").unwrap().len(), 3);
    assert_eq!(parse_board("AsKdQh5c").unwrap().len(), 4);
    assert_eq!(parse_board("As Kd Qh 5c 2s").unwrap().len(), 5);
    assert!(parse_board("AsK").is_err());
}

#[test]
fn test_parse_hand_needs_two_distinct_cards() {
    let hand = parse_hand("Kh7c").unwrap();
    assert_eq!(format_cards(&hand), "Kh7c");
    assert!(parse_hand("Kh").is_err());
    assert!(parse_hand("KhKh").is_err());
    assert!(parse_hand("Kh7c2d").is_err());
}

#[test]
fn test_remaining_cards_skips_dead() {
    let dead = parse_board("AsKh2c").unwrap();
    let live = remaining_cards(&dead);
    assert_eq!(live.len(), 49);
    assert!(dead.iter().all(|c| !live.contains(c)));
}

#[test]
fn test_dealer_deals_whole_deck_once() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut dealer = Dealer::new(&mut rng);
    let mut seen = Vec::new();
    for _ in 0..26 {
        seen.extend(dealer.deal_hand().unwrap());
    }
    assert!(dealer.is_empty());
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 52);
    assert!(matches!(
        dealer.deal_card(),
        Err(CfrError::DeckExhausted { requested: 1, available: 0 })
    ));
}

#[test]
fn test_dealer_from_cards_is_ordered() {
    let mut dealer = Dealer::from_cards(parse_board("2s3s4s5s6s").unwrap());
    assert_eq!(format_cards(&dealer.deal_flop().unwrap()), "2s3s4s");
    assert_eq!(dealer.deal_card().unwrap().to_string(), "5s");
    assert_eq!(dealer.len(), 1);
}

#[test]
fn test_dealer_seeds_reproduce() {
    let deal = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dealer = Dealer::new(&mut rng);
        dealer.deal_flop().unwrap()
    };
    assert_eq!(deal(4), deal(4));
}
