//! BPTC(196,96): the Block Product Turbo Code protecting full link
//! control and data header payloads.
//!
//! Grounded on `src/dmr/fec/bptc_196_96.c`. One divergence from that
//! source is deliberate: its column-protection loop reads
//! `deinterleaved_bits[(row * 15) + 1]` for every column instead of
//! indexing by the loop's own `col` variable, which would read the same
//! bit for all 15 columns — almost certainly a transcription bug in the
//! original, not a real column-major Hamming code. This implementation
//! indexes each column independently, matching the prose description of
//! the algorithm (columns are Hamming(13,9,3)-corrected across the 13
//! rows, one correction per column).

use crate::error::DmrError;
use crate::fec::hamming::{HAMMING_13_9_3, HAMMING_15_11_3};

const ROWS: usize = 13;
const COLS: usize = 15;
const MATRIX_BITS: usize = ROWS * COLS;
const TOTAL_BITS: usize = MATRIX_BITS + 1;
const DATA_BITS: usize = 96;

/// Applies the BPTC deinterleave permutation to 196 raw bits, returning
/// 196 bits in transmission order (index 0 is the reserved bit; indices
/// 1..196 fill the 13x15 matrix row-major).
fn deinterleave(raw: &[bool; TOTAL_BITS]) -> [bool; TOTAL_BITS] {
    let mut out = [false; TOTAL_BITS];
    for i in 1..=TOTAL_BITS {
        out[i - 1] = raw[(i * 181) % TOTAL_BITS];
    }
    out
}

/// Inverse of [`deinterleave`].
fn reinterleave(deinterleaved: &[bool; TOTAL_BITS]) -> [bool; TOTAL_BITS] {
    let mut raw = [false; TOTAL_BITS];
    for i in 1..=TOTAL_BITS {
        raw[(i * 181) % TOTAL_BITS] = deinterleaved[i - 1];
    }
    raw
}

fn matrix_index(row: usize, col: usize) -> usize {
    1 + row * COLS + col
}

/// Decodes 196 raw info bits (as extracted from a burst's two info
/// halves) into 96 data bits, correcting column and row errors via
/// Hamming(13,9,3) and Hamming(15,11,3) respectively.
pub fn decode(raw: &[bool; TOTAL_BITS]) -> Result<[bool; DATA_BITS], DmrError> {
    let deinterleaved = deinterleave(raw);
    let mut matrix = [[false; COLS]; ROWS];
    for row in 0..ROWS {
        for col in 0..COLS {
            matrix[row][col] = deinterleaved[matrix_index(row, col)];
        }
    }

    for col in 0..COLS {
        let mut column_bits: Vec<bool> = (0..ROWS).map(|row| matrix[row][col]).collect();
        HAMMING_13_9_3.decode(&mut column_bits)?;
        for (row, &bit) in column_bits.iter().enumerate() {
            matrix[row][col] = bit;
        }
    }

    for row in matrix.iter_mut().take(9) {
        HAMMING_15_11_3.decode(row)?;
    }

    let mut data = [false; DATA_BITS];
    for (i, col) in (3..=10).enumerate() {
        data[i] = matrix[0][col];
    }
    for r in 1..=8 {
        for c in 0..=10 {
            data[8 + (r - 1) * 11 + c] = matrix[r][c];
        }
    }
    Ok(data)
}

/// Encodes 96 data bits into 196 raw info bits: fills the matrix, computes
/// row parities then column parities, and reinterleaves.
pub fn encode(data: &[bool; DATA_BITS]) -> [bool; TOTAL_BITS] {
    let mut matrix = [[false; COLS]; ROWS];
    for (i, col) in (3..=10).enumerate() {
        matrix[0][col] = data[i];
    }
    for r in 1..=8 {
        for c in 0..=10 {
            matrix[r][c] = data[8 + (r - 1) * 11 + c];
        }
    }

    for row in matrix.iter_mut().take(9) {
        HAMMING_15_11_3.encode(row);
    }

    for col in 0..COLS {
        let mut column_bits: Vec<bool> = (0..ROWS).map(|row| matrix[row][col]).collect();
        HAMMING_13_9_3.encode(&mut column_bits);
        for (row, &bit) in column_bits.iter().enumerate() {
            matrix[row][col] = bit;
        }
    }

    let mut deinterleaved = [false; TOTAL_BITS];
    for row in 0..ROWS {
        for col in 0..COLS {
            deinterleaved[matrix_index(row, col)] = matrix[row][col];
        }
    }
    reinterleave(&deinterleaved)
}
