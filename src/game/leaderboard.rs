//! Leaderboard ranking

use std::cmp::Ordering;

use crate::ws::protocol::LeaderboardEntry;

use super::player::PlayerState;

/// Rank players by size, largest first, keeping the top `limit`.
///
/// Equal sizes are ordered by ascending player id so the output does not
/// depend on iteration order.
pub fn rank<'a, I>(players: I, limit: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a PlayerState>,
{
    let mut ranked: Vec<&PlayerState> = players.into_iter().filter(|p| p.size.is_finite()).collect();

    ranked.sort_by(|a, b| {
        b.size
            .partial_cmp(&a.size)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i as u32 + 1,
            player_id: p.id,
            name: p.display_name.clone(),
            size: p.size,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(id: u128, size: f32) -> PlayerState {
        PlayerState {
            id: Uuid::from_u128(id),
            user_id: Uuid::from_u128(id + 1000),
            display_name: format!("p{id}"),
            x: 0.0,
            y: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            size,
            health: 100.0,
            boosting: false,
            color: "#fff",
            emoji: None,
        }
    }

    #[test]
    fn sorted_by_size_descending_with_one_based_rank() {
        let players = vec![player(1, 10.0), player(2, 30.0), player(3, 20.0)];
        let board = rank(&players, 10);

        let ids: Vec<u128> = board.iter().map(|e| e.player_id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn ties_break_by_player_id() {
        let forward = vec![player(9, 25.0), player(4, 25.0), player(7, 25.0), player(1, 5.0)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = rank(&forward, 10);
        let b = rank(&reversed, 10);
        assert_eq!(a, b);
        let ids: Vec<u128> = a.iter().map(|e| e.player_id.as_u128()).collect();
        assert_eq!(ids, vec![4, 7, 9, 1]);
    }

    #[test]
    fn truncates_to_limit() {
        let players: Vec<PlayerState> = (0..25).map(|i| player(i, i as f32)).collect();
        let board = rank(&players, 10);
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].size, 24.0);
        assert_eq!(board[9].rank, 10);
        assert!(rank(&players, 0).is_empty());
    }
}
