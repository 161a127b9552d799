//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree at a given depth. The
//! counts are compared against published values to check the generator and
//! the rules validator together.

use super::make_move;
use crate::rules::{RuleSet, StandardChess};
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = StandardChess.legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|m| perft(&make_move(position, m), depth - 1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const DISCOVERED: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

    fn counts(fen: &str, expected: &[u64]) {
        let position = Position::from_fen(fen).unwrap();
        for (depth, nodes) in expected.iter().enumerate() {
            let depth = depth as u32 + 1;
            assert_eq!(perft(&position, depth), *nodes, "{fen} at depth {depth}");
        }
    }

    #[test]
    fn startpos() {
        let position = Position::startpos();
        assert_eq!(perft(&position, 0), 1);
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8902);
    }

    #[test]
    fn castling_and_en_passant_heavy_position() {
        counts(KIWIPETE, &[48, 2039]);
    }

    #[test]
    fn rook_endgame_with_en_passant_pins() {
        counts(ENDGAME, &[14, 191, 2812]);
    }

    #[test]
    fn underpromotions_under_check() {
        counts(PROMOTIONS, &[6, 264, 9467]);
    }

    #[test]
    fn promotion_with_discovered_attacks() {
        counts(DISCOVERED, &[44, 1486, 62379]);
    }

    #[test]
    #[ignore]
    fn deep_counts() {
        assert_eq!(perft(&Position::startpos(), 4), 197_281);
        counts(KIWIPETE, &[48, 2039, 97_862]);
    }
}
