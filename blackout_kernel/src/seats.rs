/// Blackout Kernel: Seat Arithmetic
///
/// Seats are numbered 0..num_players. "Left" of a seat is the next
/// higher number, wrapping back to seat 0.

/// Seat index at the table.
pub type Seat = usize;

/// Seat immediately left of `seat`.
pub fn next_seat(seat: Seat, total: usize) -> Seat {
    if total == 0 {
        return 0;
    }
    (seat + 1) % total
}

/// Every seat exactly once, starting at `start` (taken modulo `total`)
/// and wrapping round to 0.
pub fn circular_order(total: usize, start: Seat) -> impl Iterator<Item = Seat> {
    let start = if total == 0 { 0 } else { start % total };
    (0..total).map(move |i| (i + start) % total)
}
