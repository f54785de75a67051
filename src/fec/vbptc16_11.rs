//! Variable-row BPTC(16,11) accumulator, used to reassemble the EMB LC
//! super-structure across a voice super-frame's B-F bursts.
//!
//! Grounded on `src/dmr/fec/vbptc_16_11.c`. One divergence: that
//! source's `encode` computes the final column-parity row with
//! `parity = parity + matrix[...] % 2` — due to operator precedence this
//! is `parity + (bit % 2)` assigned back into a C `bool`, which
//! saturates to `true` the moment any bit in the column is set rather
//! than toggling, unlike its own (correct) `check_and_repair`, which
//! parenthesizes the modulo over the whole sum. This implementation
//! computes a real running XOR in both places.

use crate::error::DmrError;
use crate::fec::hamming::HAMMING_16_11_4;

const COLS: usize = 16;

/// Column-major bit accumulator with Hamming(16,11) row protection plus a
/// column-parity row, sized to `rows` rows (the last row holds parity).
pub struct Vbptc1611 {
    matrix: Vec<bool>,
    rows: usize,
    cursor_row: usize,
    cursor_col: usize,
}

impl Vbptc1611 {
    pub fn new(rows: usize) -> Self {
        Self {
            matrix: vec![false; rows * COLS],
            rows,
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    fn cell(&self, row: usize, col: usize) -> bool {
        self.matrix[row * COLS + col]
    }

    fn set_cell(&mut self, row: usize, col: usize, value: bool) {
        self.matrix[row * COLS + col] = value;
    }

    pub fn wipe(&mut self) {
        self.matrix.iter_mut().for_each(|b| *b = false);
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    fn free_space(&self) -> usize {
        (self.rows * COLS) - (self.cursor_col * self.rows + self.cursor_row)
    }

    /// Appends `bits`, column-major, advancing the write cursor down each
    /// column before moving to the next.
    pub fn add(&mut self, bits: &[bool]) -> Result<(), DmrError> {
        let space = self.free_space();
        if space == 0 {
            return Err(DmrError::OutOfMemory);
        }
        let n = bits.len().min(space);
        for &bit in &bits[..n] {
            self.set_cell(self.cursor_row, self.cursor_col, bit);
            self.cursor_row += 1;
            if self.cursor_row == self.rows {
                self.cursor_col += 1;
                self.cursor_row = 0;
            }
        }
        Ok(())
    }

    /// Retrieves up to `len` bits starting `offset` bits into column-major
    /// order, skipping `offset` bits first.
    pub fn get_fragment(&self, offset: usize, len: usize) -> Vec<bool> {
        let total = self.rows * COLS;
        let want = len.min(total);
        let mut out = Vec::with_capacity(want);
        let mut skip = offset;
        'outer: for col in 0..COLS {
            for row in 0..self.rows {
                if out.len() >= want {
                    break 'outer;
                }
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                out.push(self.cell(row, col));
            }
        }
        out
    }

    fn parity_bits(row_bits: &[bool]) -> [bool; 5] {
        let b = row_bits;
        [
            b[0] ^ b[1] ^ b[2] ^ b[3] ^ b[5] ^ b[7] ^ b[8],
            b[1] ^ b[2] ^ b[3] ^ b[4] ^ b[6] ^ b[8] ^ b[9],
            b[2] ^ b[3] ^ b[4] ^ b[5] ^ b[7] ^ b[9] ^ b[10],
            b[0] ^ b[1] ^ b[2] ^ b[4] ^ b[6] ^ b[7] ^ b[10],
            b[0] ^ b[2] ^ b[5] ^ b[6] ^ b[8] ^ b[9] ^ b[10],
        ]
    }

    /// Verifies and repairs each row via Hamming(16,11) and the final
    /// column-parity row, returning an error if any row or the column
    /// parity can't be reconciled.
    pub fn check_and_repair(&mut self) -> Result<(), DmrError> {
        if self.rows < 2 {
            return Err(DmrError::InvalidArgument("vbptc rows < 2".into()));
        }
        for row in 0..self.rows - 1 {
            let row_bits: Vec<bool> = (0..COLS).map(|col| self.cell(row, col)).collect();
            let computed = Self::parity_bits(&row_bits);
            if computed == row_bits[11..16] {
                continue;
            }
            let mut full = row_bits.clone();
            HAMMING_16_11_4.decode(&mut full)?;
            for (col, &bit) in full.iter().enumerate() {
                self.set_cell(row, col, bit);
            }
        }

        for col in 0..COLS {
            let mut parity = false;
            for row in 0..self.rows - 1 {
                parity ^= self.cell(row, col);
            }
            if parity != self.cell(self.rows - 1, col) {
                return Err(DmrError::FecUncorrectable("vbptc_16_11"));
            }
        }
        Ok(())
    }

    /// Reads out the 11 data bits of every row but the last (parity) row.
    pub fn decode(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity((self.rows - 1) * 11);
        for row in 0..self.rows - 1 {
            for col in 0..11 {
                out.push(self.cell(row, col));
            }
        }
        out
    }

    /// Fills the matrix row-major from `bits` (11 columns per row),
    /// computes Hamming(16,11) row parity and the column-parity row.
    pub fn encode(&mut self, bits: &[bool]) {
        self.wipe();
        let capacity = (self.rows - 1) * 11;
        let n = bits.len().min(capacity);
        let mut row = 0;
        let mut col = 0;
        for &bit in &bits[..n] {
            self.set_cell(row, col, bit);
            col += 1;
            if col == 11 {
                row += 1;
                col = 0;
            }
        }

        for row in 0..self.rows - 1 {
            let row_bits: Vec<bool> = (0..11).map(|c| self.cell(row, c)).collect();
            let parity = Self::parity_bits(&row_bits);
            for (i, &bit) in parity.iter().enumerate() {
                self.set_cell(row, 11 + i, bit);
            }
        }

        for col in 0..COLS {
            let mut parity = false;
            for row in 0..self.rows - 1 {
                parity ^= self.cell(row, col);
            }
            self.set_cell(self.rows - 1, col, parity);
        }
    }
}
