//! Binary addition with SC/MP carry and overflow semantics.

/// Result of an 8-bit add with carry-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
    /// Low eight bits of the sum.
    pub value: u8,
    /// Carry out of bit 7.
    pub carry: bool,
    /// Both operands share a sign that differs from the result's sign.
    pub overflow: bool,
}

/// Computes `accumulator + operand + carry_in`.
///
/// Subtraction is expressed by passing the one's complement of the
/// subtrahend with carry set for "no borrow".
#[must_use]
pub const fn add_with_carry(accumulator: u8, operand: u8, carry_in: bool) -> AddResult {
    let value = accumulator
        .wrapping_add(operand)
        .wrapping_add(carry_in as u8);
    let carry = ((accumulator & operand) | (operand & !value) | (!value & accumulator)) & 0x80;
    let overflow = ((value & !accumulator & !operand) | (!value & accumulator & operand)) & 0x80;
    AddResult {
        value,
        carry: carry != 0,
        overflow: overflow != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::add_with_carry;

    #[test]
    fn carry_out_of_bit_seven() {
        let result = add_with_carry(0xFF, 0x01, false);
        assert_eq!(result.value, 0x00);
        assert!(result.carry);
        assert!(!result.overflow);
    }

    #[test]
    fn positive_plus_positive_overflows_into_sign_bit() {
        let result = add_with_carry(0x7F, 0x01, false);
        assert_eq!(result.value, 0x80);
        assert!(!result.carry);
        assert!(result.overflow);
    }

    #[test]
    fn complement_add_with_carry_subtracts() {
        let result = add_with_carry(0x05, !0x03, true);
        assert_eq!(result.value, 0x02);
        assert!(result.carry);
        assert!(!result.overflow);

        let borrow = add_with_carry(0x03, !0x05, true);
        assert_eq!(borrow.value, 0xFE);
        assert!(!borrow.carry);
    }
}
