//! The unit-conversion table.
//!
//! Core code stores eV and m⁻³ throughout; keV and 10²⁰ m⁻³ exist only at
//! the display/persistence boundary. Every conversion in the workspace is
//! one of the functions below.

use crate::consts::{EV_TO_J, MW_PER_M3_TO_EV_PER_M3_S};

/// Converts eV to keV.
#[inline]
pub fn ev_to_kev(ev: f64) -> f64 {
    ev / 1e3
}

/// Converts keV to eV.
#[inline]
pub fn kev_to_ev(kev: f64) -> f64 {
    kev * 1e3
}

/// Converts eV to Joule.
#[inline]
pub fn ev_to_joule(ev: f64) -> f64 {
    ev * EV_TO_J
}

/// Converts Joule to eV.
#[inline]
pub fn joule_to_ev(joule: f64) -> f64 {
    joule / EV_TO_J
}

/// Converts a heating density from MW/m³ to the eV/(m³·s) rate used by the
/// temperature equations.
#[inline]
pub fn mw_per_m3_to_ev_rate(mw: f64) -> f64 {
    mw * MW_PER_M3_TO_EV_PER_M3_S
}

/// Converts W to MW.
#[inline]
pub fn watt_to_mw(watt: f64) -> f64 {
    watt / 1e6
}

/// Converts MW to W.
#[inline]
pub fn mw_to_watt(mw: f64) -> f64 {
    mw * 1e6
}

/// Converts A/m² to MA/m² (the canonical current-source unit).
#[inline]
pub fn a_to_ma(a: f64) -> f64 {
    a * 1e-6
}

/// Converts MA/m² to A/m².
#[inline]
pub fn ma_to_a(ma: f64) -> f64 {
    ma * 1e6
}

/// Converts m⁻³ to the display unit 10²⁰ m⁻³.
#[inline]
pub fn density_to_1e20(ne: f64) -> f64 {
    ne / 1e20
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trips() {
        assert_relative_eq!(kev_to_ev(ev_to_kev(12.5e3)), 12.5e3);
        assert_relative_eq!(joule_to_ev(ev_to_joule(3.1e3)), 3.1e3);
        assert_relative_eq!(ma_to_a(a_to_ma(2.4e6)), 2.4e6);
        assert_relative_eq!(mw_to_watt(watt_to_mw(5e7)), 5e7);
    }

    #[test]
    fn heating_rate_bridge() {
        // 1 MW/m³ deposited in a 1 eV-per-particle bucket.
        assert_relative_eq!(mw_per_m3_to_ev_rate(1.0), 6.241_509_074_4e24, max_relative = 1e-12);
    }
}
