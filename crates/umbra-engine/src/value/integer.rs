//! Partially-known integers
//!
//! `IntValue` is a tristate number: `bits` holds the known bit values and
//! `unknown` marks the positions that could be either 0 or 1. Every operator
//! is conservative, so a result bit is only marked known when the inputs
//! prove it, and refining an input never widens a result's unknown mask.

use std::fmt;

use crate::trilean::Trilean;
use crate::types::Width;

/// A fixed-width integer tracking each bit as known-0, known-1, or unknown.
///
/// Canonical form: `bits & unknown == 0` and both fields fit the width mask.
/// An unknown bit position reads as 0 in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntValue {
    bits: u64,
    unknown: u64,
    width: Width,
}

/// Sign-extend the low `width` bits of `v` to the full 64.
fn sign_extend_raw(v: u64, width: Width) -> u64 {
    let shift = 64 - width.bits();
    (((v << shift) as i64) >> shift) as u64
}

/// Tristate addition on raw (bits, unknown) pairs at full 64-bit width.
///
/// Carries that may emerge from unknown positions widen the result mask.
fn add_raw(a: (u64, u64), b: (u64, u64)) -> (u64, u64) {
    let sm = a.1.wrapping_add(b.1);
    let sv = a.0.wrapping_add(b.0);
    let sigma = sm.wrapping_add(sv);
    let chi = sigma ^ sv;
    let mu = chi | a.1 | b.1;
    (sv & !mu, mu)
}

impl IntValue {
    /// A fully known value. Truncated to the width.
    pub fn known(value: u64, width: Width) -> Self {
        IntValue {
            bits: value & width.mask(),
            unknown: 0,
            width,
        }
    }

    /// A value with the given known bits and unknown mask.
    ///
    /// Both patterns are truncated to the width; known bits under the
    /// unknown mask are cleared to restore canonical form.
    pub fn partial(bits: u64, unknown: u64, width: Width) -> Self {
        let unknown = unknown & width.mask();
        IntValue {
            bits: bits & width.mask() & !unknown,
            unknown,
            width,
        }
    }

    /// A value with every bit unknown.
    pub fn unknown(width: Width) -> Self {
        IntValue {
            bits: 0,
            unknown: width.mask(),
            width,
        }
    }

    /// A known 32-bit value from a signed constant.
    pub fn from_i32(value: i32) -> Self {
        IntValue::known(value as u32 as u64, Width::W32)
    }

    /// A known 64-bit value from a signed constant.
    pub fn from_i64(value: i64) -> Self {
        IntValue::known(value as u64, Width::W64)
    }

    #[must_use]
    pub fn width(self) -> Width {
        self.width
    }

    /// The known bit pattern; unknown positions read as 0.
    #[must_use]
    pub fn known_bits(self) -> u64 {
        self.bits
    }

    /// The mask of unknown bit positions.
    #[must_use]
    pub fn unknown_mask(self) -> u64 {
        self.unknown
    }

    #[must_use]
    pub fn is_fully_known(self) -> bool {
        self.unknown == 0
    }

    /// The concrete value, if every bit is known.
    #[must_use]
    pub fn value(self) -> Option<u64> {
        (self.unknown == 0).then_some(self.bits)
    }

    /// The concrete value as a sign-extended i64, if every bit is known.
    #[must_use]
    pub fn signed_value(self) -> Option<i64> {
        self.value().map(|v| sign_extend_raw(v, self.width) as i64)
    }

    /// Smallest possible value under an unsigned reading.
    #[must_use]
    pub fn umin(self) -> u64 {
        self.bits
    }

    /// Largest possible value under an unsigned reading.
    #[must_use]
    pub fn umax(self) -> u64 {
        self.bits | self.unknown
    }

    /// Smallest possible value under a signed reading.
    #[must_use]
    pub fn smin(self) -> i64 {
        let raw = self.bits | (self.unknown & self.width.sign_bit());
        sign_extend_raw(raw, self.width) as i64
    }

    /// Largest possible value under a signed reading.
    #[must_use]
    pub fn smax(self) -> i64 {
        let raw = self.bits | (self.unknown & !self.width.sign_bit());
        sign_extend_raw(raw, self.width) as i64
    }

    // ===== Bitwise operators =====

    /// Bitwise AND. A known 0 on either side forces a known 0.
    pub fn and(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let alpha = self.bits | self.unknown;
        let beta = rhs.bits | rhs.unknown;
        let v = self.bits & rhs.bits;
        IntValue::partial(v, alpha & beta & !v, self.width)
    }

    /// Bitwise OR. A known 1 on either side forces a known 1.
    pub fn or(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let v = self.bits | rhs.bits;
        let mu = self.unknown | rhs.unknown;
        IntValue::partial(v, mu & !v, self.width)
    }

    /// Bitwise XOR. A result bit is unknown iff either input bit is.
    pub fn xor(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let v = self.bits ^ rhs.bits;
        let mu = self.unknown | rhs.unknown;
        IntValue::partial(v & !mu, mu, self.width)
    }

    /// Bitwise complement. Known bits invert, unknown bits stay unknown.
    pub fn not(self) -> IntValue {
        IntValue::partial(!(self.bits | self.unknown), self.unknown, self.width)
    }

    // ===== Arithmetic operators =====

    /// Wrapping addition with carry-aware mask propagation.
    pub fn add(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let (bits, unknown) = add_raw((self.bits, self.unknown), (rhs.bits, rhs.unknown));
        IntValue::partial(bits, unknown, self.width)
    }

    /// Wrapping subtraction with borrow-aware mask propagation.
    pub fn sub(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let dv = self.bits.wrapping_sub(rhs.bits);
        let alpha = dv.wrapping_add(self.unknown);
        let beta = dv.wrapping_sub(rhs.unknown);
        let chi = alpha ^ beta;
        let mu = chi | self.unknown | rhs.unknown;
        IntValue::partial(dv & !mu, mu, self.width)
    }

    /// Wrapping multiplication via shift-add decomposition of `self`.
    ///
    /// A certain 1 bit contributes the other side's mask; an uncertain bit
    /// contributes the other side entirely as mask.
    pub fn mul(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        let acc_v = self.bits.wrapping_mul(rhs.bits);
        let mut acc_m = (0u64, 0u64);
        let mut a = (self.bits, self.unknown);
        let mut b = (rhs.bits, rhs.unknown);
        while a.0 != 0 || a.1 != 0 {
            if a.0 & 1 != 0 {
                acc_m = add_raw(acc_m, (0, b.1));
            } else if a.1 & 1 != 0 {
                acc_m = add_raw(acc_m, (0, b.0 | b.1));
            }
            a = (a.0 >> 1, a.1 >> 1);
            b = (b.0 << 1, b.1 << 1);
        }
        let (bits, unknown) = add_raw((acc_v, 0), acc_m);
        IntValue::partial(bits, unknown, self.width)
    }

    /// Signed division, exact only when both sides are fully known.
    ///
    /// The caller rules out a known-zero divisor first; a possibly-zero
    /// divisor degrades to a fully unknown result like any other unknown.
    pub fn div(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        match (self.signed_value(), rhs.signed_value()) {
            (Some(a), Some(b)) if b != 0 => {
                IntValue::known(a.wrapping_div(b) as u64, self.width)
            }
            _ => IntValue::unknown(self.width),
        }
    }

    /// Signed remainder, exact only when both sides are fully known.
    pub fn rem(self, rhs: IntValue) -> IntValue {
        debug_assert_eq!(self.width, rhs.width);
        match (self.signed_value(), rhs.signed_value()) {
            (Some(a), Some(b)) if b != 0 => {
                IntValue::known(a.wrapping_rem(b) as u64, self.width)
            }
            _ => IntValue::unknown(self.width),
        }
    }

    /// Two's-complement negation.
    pub fn neg(self) -> IntValue {
        IntValue::known(0, self.width).sub(self)
    }

    // ===== Shifts =====

    /// Left shift. An unknown amount makes every bit unknown.
    pub fn shl(self, amount: IntValue) -> IntValue {
        let Some(k) = amount.value() else {
            return IntValue::unknown(self.width);
        };
        if k >= u64::from(self.width.bits()) {
            return IntValue::known(0, self.width);
        }
        IntValue::partial(self.bits << k, self.unknown << k, self.width)
    }

    /// Logical right shift. An unknown amount makes every bit unknown.
    pub fn shr(self, amount: IntValue) -> IntValue {
        let Some(k) = amount.value() else {
            return IntValue::unknown(self.width);
        };
        if k >= u64::from(self.width.bits()) {
            return IntValue::known(0, self.width);
        }
        IntValue::partial(self.bits >> k, self.unknown >> k, self.width)
    }

    /// Arithmetic right shift. An unknown sign bit replicates as unknown.
    pub fn sar(self, amount: IntValue) -> IntValue {
        let Some(k) = amount.value() else {
            return IntValue::unknown(self.width);
        };
        let k = k.min(u64::from(self.width.bits()) - 1);
        let bits = (sign_extend_raw(self.bits, self.width) as i64) >> k;
        let unknown = (sign_extend_raw(self.unknown, self.width) as i64) >> k;
        IntValue::partial(bits as u64, unknown as u64, self.width)
    }

    // ===== Comparisons =====

    /// Three-valued equality.
    ///
    /// Definitely false as soon as one bit position is known on both sides
    /// and disagrees; definitely true only when both sides are fully known.
    pub fn is_eq(self, rhs: IntValue) -> Trilean {
        debug_assert_eq!(self.width, rhs.width);
        if self.unknown == 0 && rhs.unknown == 0 {
            return Trilean::from(self.bits == rhs.bits);
        }
        let decided = !self.unknown & !rhs.unknown;
        if (self.bits ^ rhs.bits) & decided != 0 {
            return Trilean::False;
        }
        Trilean::Unknown
    }

    /// Three-valued unsigned less-than, decided by interval separation.
    pub fn is_lt_unsigned(self, rhs: IntValue) -> Trilean {
        debug_assert_eq!(self.width, rhs.width);
        if self.umax() < rhs.umin() {
            Trilean::True
        } else if self.umin() >= rhs.umax() {
            Trilean::False
        } else {
            Trilean::Unknown
        }
    }

    /// Three-valued signed less-than, decided by interval separation.
    pub fn is_lt_signed(self, rhs: IntValue) -> Trilean {
        debug_assert_eq!(self.width, rhs.width);
        if self.smax() < rhs.smin() {
            Trilean::True
        } else if self.smin() >= rhs.smax() {
            Trilean::False
        } else {
            Trilean::Unknown
        }
    }

    /// Three-valued truthiness: any known 1 bit decides it.
    pub fn is_nonzero(self) -> Trilean {
        if self.bits != 0 {
            Trilean::True
        } else if self.unknown == 0 {
            Trilean::False
        } else {
            Trilean::Unknown
        }
    }

    // ===== Width adaptation =====

    /// Widen with known-zero upper bits.
    pub fn zero_extend(self, to: Width) -> IntValue {
        debug_assert!(to.bits() >= self.width.bits());
        IntValue {
            bits: self.bits,
            unknown: self.unknown,
            width: to,
        }
    }

    /// Widen by replicating the sign bit; an unknown sign extends as unknown.
    pub fn sign_extend(self, to: Width) -> IntValue {
        debug_assert!(to.bits() >= self.width.bits());
        IntValue::partial(
            sign_extend_raw(self.bits, self.width),
            sign_extend_raw(self.unknown, self.width),
            to,
        )
    }

    /// Narrow by dropping upper bits.
    pub fn truncate(self, to: Width) -> IntValue {
        debug_assert!(to.bits() <= self.width.bits());
        IntValue::partial(self.bits, self.unknown, to)
    }
}

impl fmt::Display for IntValue {
    /// Known values print as `0x2a`; partial values as `bits/mask`,
    /// e.g. `0x0/0xff` for a fully unknown byte.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unknown == 0 {
            write!(f, "{:#x}", self.bits)
        } else {
            write!(f, "{:#x}/{:#x}", self.bits, self.unknown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w8(bits: u64, unknown: u64) -> IntValue {
        IntValue::partial(bits, unknown, Width::W8)
    }

    #[test]
    fn canonical_form_masks_and_clears_overlap() {
        let v = IntValue::partial(0xFFFF, 0x0F0F, Width::W8);
        assert_eq!(v.known_bits(), 0xF0);
        assert_eq!(v.unknown_mask(), 0x0F);
        assert_eq!(IntValue::known(0x1FF, Width::W8).known_bits(), 0xFF);
    }

    #[test]
    fn known_arithmetic_wraps_at_width() {
        let a = IntValue::known(0xFF, Width::W8);
        let b = IntValue::known(1, Width::W8);
        assert_eq!(a.add(b), IntValue::known(0, Width::W8));
        assert_eq!(b.sub(a), IntValue::known(2, Width::W8));
        assert_eq!(a.mul(a), IntValue::known(1, Width::W8));
    }

    #[test]
    fn and_known_zero_dominates() {
        let any = w8(0, 0xFF);
        let zero = IntValue::known(0, Width::W8);
        assert_eq!(any.and(zero), zero);
        let low = IntValue::known(0x0F, Width::W8);
        let masked = any.and(low);
        assert_eq!(masked.known_bits(), 0);
        assert_eq!(masked.unknown_mask(), 0x0F);
    }

    #[test]
    fn or_known_one_dominates() {
        let any = w8(0, 0xFF);
        let ones = IntValue::known(0xFF, Width::W8);
        assert_eq!(any.or(ones), ones);
        let high = IntValue::known(0xF0, Width::W8);
        let merged = any.or(high);
        assert_eq!(merged.known_bits(), 0xF0);
        assert_eq!(merged.unknown_mask(), 0x0F);
    }

    #[test]
    fn xor_poisons_exactly_the_unknown_positions() {
        let a = w8(0b1010_0000, 0b0000_1100);
        let b = IntValue::known(0b1111_0000, Width::W8);
        let r = a.xor(b);
        assert_eq!(r.unknown_mask(), 0b0000_1100);
        assert_eq!(r.known_bits(), 0b0101_0000);
    }

    #[test]
    fn not_inverts_known_and_keeps_unknown() {
        let v = w8(0b0011_0000, 0b0000_1111);
        let n = v.not();
        assert_eq!(n.known_bits(), 0b1100_0000);
        assert_eq!(n.unknown_mask(), 0b0000_1111);
        assert_eq!(n.not(), v);
    }

    #[test]
    fn add_spreads_carry_through_contiguous_known_ones() {
        let a = IntValue::known(0x0F, Width::W8);
        let b = w8(0, 0x01);
        let r = a.add(b);
        // A carry out of bit 0 can ripple through the four set bits.
        assert_eq!(r.unknown_mask(), 0x1F);
        assert_eq!(r.known_bits(), 0);
    }

    #[test]
    fn add_keeps_independent_regions_known() {
        let a = w8(0, 0x0F);
        let b = IntValue::known(0x40, Width::W8);
        let r = a.add(b);
        assert_eq!(r.known_bits() & 0x40, 0x40);
        assert_eq!(r.unknown_mask(), 0x0F);
    }

    #[test]
    fn signed_division_and_remainder() {
        let a = IntValue::known(-7i64 as u64, Width::W32);
        let b = IntValue::known(2, Width::W32);
        assert_eq!(a.div(b).signed_value(), Some(-3));
        assert_eq!(a.rem(b).signed_value(), Some(-1));
        assert_eq!(a.div(w8(0, 0xFF).zero_extend(Width::W32)), IntValue::unknown(Width::W32));
    }

    #[test]
    fn neg_is_twos_complement() {
        let five = IntValue::from_i32(5);
        assert_eq!(five.neg().signed_value(), Some(-5));
        assert_eq!(five.neg().neg(), five);
    }

    #[test]
    fn shifts_with_known_amounts() {
        let v = w8(0b0000_0110, 0b0001_0000);
        let two = IntValue::known(2, Width::W8);
        let l = v.shl(two);
        assert_eq!(l.known_bits(), 0b0001_1000);
        assert_eq!(l.unknown_mask(), 0b0100_0000);
        let r = v.shr(two);
        assert_eq!(r.known_bits(), 0b0000_0001);
        assert_eq!(r.unknown_mask(), 0b0000_0100);
    }

    #[test]
    fn shift_at_or_past_width_clears() {
        let v = IntValue::known(0xAB, Width::W8);
        let eight = IntValue::known(8, Width::W8);
        assert_eq!(v.shl(eight), IntValue::known(0, Width::W8));
        assert_eq!(v.shr(eight), IntValue::known(0, Width::W8));
    }

    #[test]
    fn shift_by_unknown_amount_is_opaque() {
        let v = IntValue::known(0xAB, Width::W8);
        let amt = w8(0, 0x03);
        assert_eq!(v.shl(amt), IntValue::unknown(Width::W8));
        assert_eq!(v.sar(amt), IntValue::unknown(Width::W8));
    }

    #[test]
    fn sar_replicates_known_sign() {
        let neg = IntValue::known(0x80, Width::W8);
        let four = IntValue::known(4, Width::W8);
        assert_eq!(neg.sar(four), IntValue::known(0xF8, Width::W8));
        let big = IntValue::known(16, Width::W8);
        assert_eq!(neg.sar(big), IntValue::known(0xFF, Width::W8));
    }

    #[test]
    fn sar_replicates_unknown_sign_as_unknown() {
        let v = w8(0, 0x80);
        let four = IntValue::known(4, Width::W8);
        let r = v.sar(four);
        assert_eq!(r.known_bits(), 0);
        assert_eq!(r.unknown_mask(), 0xF8);
    }

    #[test]
    fn equality_decided_by_disagreeing_known_bit() {
        let a = w8(0b1000_0000, 0b0111_1111);
        let b = w8(0b0000_0000, 0b0111_1111);
        assert_eq!(a.is_eq(b), Trilean::False);
        assert_eq!(a.is_eq(a), Trilean::Unknown);
        let k = IntValue::known(42, Width::W8);
        assert_eq!(k.is_eq(IntValue::known(42, Width::W8)), Trilean::True);
    }

    #[test]
    fn unsigned_order_decided_by_interval_separation() {
        let low = w8(0, 0x0F);
        let high = w8(0x40, 0x0F);
        assert_eq!(low.is_lt_unsigned(high), Trilean::True);
        assert_eq!(high.is_lt_unsigned(low), Trilean::False);
        assert_eq!(low.is_lt_unsigned(w8(0x08, 0x07)), Trilean::Unknown);
    }

    #[test]
    fn signed_order_sees_the_sign_bit() {
        let neg = IntValue::known(0xFF, Width::W8);
        let pos = IntValue::known(1, Width::W8);
        assert_eq!(neg.is_lt_signed(pos), Trilean::True);
        assert_eq!(neg.is_lt_unsigned(pos), Trilean::False);
        // Only the sign bit unknown: both candidates (0 and -128) are below 1.
        assert_eq!(w8(0, 0x80).is_lt_signed(pos), Trilean::True);
        // Candidates straddle the bound once bit 0 is unknown too.
        assert_eq!(w8(0, 0x81).is_lt_signed(pos), Trilean::Unknown);
    }

    #[test]
    fn truthiness() {
        assert_eq!(IntValue::known(0, Width::W32).is_nonzero(), Trilean::False);
        assert_eq!(IntValue::known(4, Width::W32).is_nonzero(), Trilean::True);
        assert_eq!(w8(0x10, 0x01).is_nonzero(), Trilean::True);
        assert_eq!(w8(0, 0x01).is_nonzero(), Trilean::Unknown);
    }

    #[test]
    fn extension_and_truncation() {
        let v = w8(0x12, 0x80);
        let z = v.zero_extend(Width::W32);
        assert_eq!(z.known_bits(), 0x12);
        assert_eq!(z.unknown_mask(), 0x80);
        let s = v.sign_extend(Width::W32);
        assert_eq!(s.known_bits(), 0x12);
        assert_eq!(s.unknown_mask(), 0xFFFF_FF80);
        let neg = IntValue::known(0x80, Width::W8).sign_extend(Width::W32);
        assert_eq!(neg.known_bits(), 0xFFFF_FF80);
        assert_eq!(s.truncate(Width::W8), v);
    }

    #[test]
    fn display_forms() {
        assert_eq!(IntValue::from_i32(42).to_string(), "0x2a");
        assert_eq!(w8(0, 0xFF).to_string(), "0x0/0xff");
        assert_eq!(w8(0x12, 0xC0).to_string(), "0x12/0xc0");
    }
}
