//! Formula display - packed polynomial pairs as readable equations
//!
//! Each side of a formula is a big unsigned integer whose big-endian bytes
//! are polynomial coefficients, highest power first. `0x0105` on the x side
//! reads as `1x + 5`.
//!
//! Zero coefficients are never printed, including the constant term, so a
//! side that is entirely zero renders as nothing at all.

use std::fmt;

use prism_core::{Formula, Magnitude};

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Render a power with Unicode superscript digits
pub fn superscript(n: usize) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => SUPERSCRIPT_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

/// One side of an equation: coefficients in a named variable
#[derive(Debug, Clone, Copy)]
pub struct Polynomial<'a> {
    coefficients: &'a [u8],
    variable: char,
}

impl<'a> Polynomial<'a> {
    pub fn new(coefficients: &'a [u8], variable: char) -> Self {
        Polynomial {
            coefficients,
            variable,
        }
    }

    /// Highest power represented by the coefficient bytes
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Nonzero terms as (coefficient, power), highest power first
    pub fn terms(&self) -> impl Iterator<Item = (u8, usize)> + 'a {
        let degree = self.degree();
        let coefficients = self.coefficients;
        coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(move |(i, c)| (*c, degree - i))
    }
}

impl fmt::Display for Polynomial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (coefficient, power)) in self.terms().enumerate() {
            if n > 0 {
                f.write_str(" + ")?;
            }
            match power {
                0 => write!(f, "{}", coefficient)?,
                1 => write!(f, "{}{}", coefficient, self.variable)?,
                _ => write!(f, "{}{}{}", coefficient, self.variable, superscript(power))?,
            }
        }
        Ok(())
    }
}

/// Format one side of an equation
pub fn format_polynomial(coefficients: &[u8], variable: char) -> String {
    Polynomial::new(coefficients, variable).to_string()
}

/// Format a packed pair as `<x polynomial> = <y polynomial>`
pub fn format_formula(x: &Magnitude, y: &Magnitude) -> String {
    format!(
        "{} = {}",
        Polynomial::new(x.as_be_bytes(), 'x'),
        Polynomial::new(y.as_be_bytes(), 'y')
    )
}

/// Hover label text for a formula attribute value
pub fn formula_label(formula: &Formula) -> String {
    format_formula(&formula.x, &formula.y)
}
