/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Precession, nutation, obliquity and sidereal time.

use crate::constants::{ASEC2RAD, ASEC360, DEG2RAD};
use crate::math::rotation::{rot_x, rot_z, RotationMatrix};
use crate::math::vectors::AstroVector;
use crate::time::{era, AstroTime};

/// Selects the sense of a precession or nutation rotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrecessDirection {
    /// From the J2000 frame into the frame of date.
    From2000,
    /// From the frame of date into the J2000 frame.
    Into2000,
}

/// The five Earth-orientation scalars returned by [e_tilt].
#[derive(Copy, Clone, Debug)]
pub struct EarthTilt {
    /// Nutation in longitude, arcseconds.
    pub dpsi: f64,
    /// Nutation in obliquity, arcseconds.
    pub deps: f64,
    /// Mean obliquity of the ecliptic, degrees.
    pub mobl: f64,
    /// True obliquity of the ecliptic, degrees.
    pub tobl: f64,
    /// Equation of the equinoxes, sidereal hours.
    pub ee: f64,
}

struct NutationRow {
    nl: i8,
    nlp: i8,
    nf: i8,
    nd: i8,
    nom: i8,
    ps: f64,
    pst: f64,
    pc: f64,
    ec: f64,
    ect: f64,
    es: f64,
}

/// Truncated IAU 2000B luni-solar nutation series. Coefficients are in units
/// of 0.1 microarcseconds.
static IAU2000B: [NutationRow; 77] = [
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: 0, nom: 1, ps: -172064161.0, pst: -174666.0, pc: 33386.0, ec: 92052331.0, ect: 9086.0, es: 15377.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: -2, nom: 2, ps: -13170906.0, pst: -1675.0, pc: -13696.0, ec: 5730336.0, ect: -3015.0, es: -4587.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 0, nom: 2, ps: -2276413.0, pst: -234.0, pc: 2796.0, ec: 978459.0, ect: -485.0, es: 1374.0 },
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: 0, nom: 2, ps: 2074554.0, pst: 207.0, pc: -698.0, ec: -897492.0, ect: 470.0, es: -291.0 },
    NutationRow { nl: 0, nlp: 1, nf: 0, nd: 0, nom: 0, ps: 1475877.0, pst: -3633.0, pc: 11817.0, ec: 73871.0, ect: -184.0, es: -1924.0 },
    NutationRow { nl: 0, nlp: 1, nf: 2, nd: -2, nom: 2, ps: -516821.0, pst: 1226.0, pc: -524.0, ec: 224386.0, ect: -677.0, es: -174.0 },
    NutationRow { nl: 1, nlp: 0, nf: 0, nd: 0, nom: 0, ps: 711159.0, pst: 73.0, pc: -872.0, ec: -6750.0, ect: 0.0, es: 358.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 0, nom: 1, ps: -387298.0, pst: -367.0, pc: 380.0, ec: 200728.0, ect: 18.0, es: 318.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: 0, nom: 2, ps: -301461.0, pst: -36.0, pc: 816.0, ec: 129025.0, ect: -63.0, es: 367.0 },
    NutationRow { nl: 0, nlp: -1, nf: 2, nd: -2, nom: 2, ps: 215829.0, pst: -494.0, pc: 111.0, ec: -95929.0, ect: 299.0, es: 132.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: -2, nom: 1, ps: 128227.0, pst: 137.0, pc: 181.0, ec: -68982.0, ect: -9.0, es: 39.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 0, nom: 2, ps: 123457.0, pst: 11.0, pc: 19.0, ec: -53311.0, ect: 32.0, es: -4.0 },
    NutationRow { nl: -1, nlp: 0, nf: 0, nd: 2, nom: 0, ps: 156994.0, pst: 10.0, pc: -168.0, ec: -1235.0, ect: 0.0, es: 82.0 },
    NutationRow { nl: 1, nlp: 0, nf: 0, nd: 0, nom: 1, ps: 63110.0, pst: 63.0, pc: 27.0, ec: -33228.0, ect: 0.0, es: -9.0 },
    NutationRow { nl: -1, nlp: 0, nf: 0, nd: 0, nom: 1, ps: -57976.0, pst: -63.0, pc: -189.0, ec: 31429.0, ect: 0.0, es: -75.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 2, nom: 2, ps: -59641.0, pst: -11.0, pc: 149.0, ec: 25543.0, ect: -11.0, es: 66.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: 0, nom: 1, ps: -51613.0, pst: -42.0, pc: 129.0, ec: 26366.0, ect: 0.0, es: 78.0 },
    NutationRow { nl: -2, nlp: 0, nf: 2, nd: 0, nom: 1, ps: 45893.0, pst: 50.0, pc: 31.0, ec: -24236.0, ect: -10.0, es: 20.0 },
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: 2, nom: 0, ps: 63384.0, pst: 11.0, pc: -150.0, ec: -1220.0, ect: 0.0, es: 29.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 2, nom: 2, ps: -38571.0, pst: -1.0, pc: 158.0, ec: 16452.0, ect: -11.0, es: 68.0 },
    NutationRow { nl: 0, nlp: -2, nf: 2, nd: -2, nom: 2, ps: 32481.0, pst: 0.0, pc: 0.0, ec: -13870.0, ect: 0.0, es: 0.0 },
    NutationRow { nl: -2, nlp: 0, nf: 0, nd: 2, nom: 0, ps: -47722.0, pst: 0.0, pc: -18.0, ec: 477.0, ect: 0.0, es: -25.0 },
    NutationRow { nl: 2, nlp: 0, nf: 2, nd: 0, nom: 2, ps: -31046.0, pst: -1.0, pc: 131.0, ec: 13238.0, ect: -11.0, es: 59.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: -2, nom: 2, ps: 28593.0, pst: 0.0, pc: -1.0, ec: -12338.0, ect: 10.0, es: -3.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 0, nom: 1, ps: 20441.0, pst: 21.0, pc: 10.0, ec: -10758.0, ect: 0.0, es: -3.0 },
    NutationRow { nl: 2, nlp: 0, nf: 0, nd: 0, nom: 0, ps: 29243.0, pst: 0.0, pc: -74.0, ec: -609.0, ect: 0.0, es: 13.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 0, nom: 0, ps: 25887.0, pst: 0.0, pc: -66.0, ec: -550.0, ect: 0.0, es: 11.0 },
    NutationRow { nl: 0, nlp: 1, nf: 0, nd: 0, nom: 1, ps: -14053.0, pst: -25.0, pc: 79.0, ec: 8551.0, ect: -2.0, es: -45.0 },
    NutationRow { nl: -1, nlp: 0, nf: 0, nd: 2, nom: 1, ps: 15164.0, pst: 10.0, pc: 11.0, ec: -8001.0, ect: 0.0, es: -1.0 },
    NutationRow { nl: 0, nlp: 2, nf: 2, nd: -2, nom: 2, ps: -15794.0, pst: 72.0, pc: -16.0, ec: 6850.0, ect: -42.0, es: -5.0 },
    NutationRow { nl: 0, nlp: 0, nf: -2, nd: 2, nom: 0, ps: 21783.0, pst: 0.0, pc: 13.0, ec: -167.0, ect: 0.0, es: 13.0 },
    NutationRow { nl: 1, nlp: 0, nf: 0, nd: -2, nom: 1, ps: -12873.0, pst: -10.0, pc: -37.0, ec: 6953.0, ect: 0.0, es: -14.0 },
    NutationRow { nl: 0, nlp: -1, nf: 0, nd: 0, nom: 1, ps: -12654.0, pst: 11.0, pc: 63.0, ec: 6415.0, ect: 0.0, es: 26.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 2, nom: 1, ps: -10204.0, pst: 0.0, pc: 25.0, ec: 5222.0, ect: 0.0, es: 15.0 },
    NutationRow { nl: 0, nlp: 2, nf: 0, nd: 0, nom: 0, ps: 16707.0, pst: -85.0, pc: -10.0, ec: 168.0, ect: -1.0, es: 10.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: 2, nom: 2, ps: -7691.0, pst: 0.0, pc: 44.0, ec: 3268.0, ect: 0.0, es: 19.0 },
    NutationRow { nl: -2, nlp: 0, nf: 2, nd: 0, nom: 0, ps: -11024.0, pst: 0.0, pc: -14.0, ec: 104.0, ect: 0.0, es: 2.0 },
    NutationRow { nl: 0, nlp: 1, nf: 2, nd: 0, nom: 2, ps: 7566.0, pst: -21.0, pc: -11.0, ec: -3250.0, ect: 0.0, es: -5.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 2, nom: 1, ps: -6637.0, pst: -11.0, pc: 25.0, ec: 3353.0, ect: 0.0, es: 14.0 },
    NutationRow { nl: 0, nlp: -1, nf: 2, nd: 0, nom: 2, ps: -7141.0, pst: 21.0, pc: 8.0, ec: 3070.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: 2, nom: 1, ps: -6302.0, pst: -11.0, pc: 2.0, ec: 3272.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: -2, nom: 1, ps: 5800.0, pst: 10.0, pc: 2.0, ec: -3045.0, ect: 0.0, es: -1.0 },
    NutationRow { nl: 2, nlp: 0, nf: 2, nd: -2, nom: 2, ps: 6443.0, pst: 0.0, pc: -7.0, ec: -2768.0, ect: 0.0, es: -4.0 },
    NutationRow { nl: -2, nlp: 0, nf: 0, nd: 2, nom: 1, ps: -5774.0, pst: -11.0, pc: -15.0, ec: 3041.0, ect: 0.0, es: -5.0 },
    NutationRow { nl: 2, nlp: 0, nf: 2, nd: 0, nom: 1, ps: -5350.0, pst: 0.0, pc: 21.0, ec: 2695.0, ect: 0.0, es: 12.0 },
    NutationRow { nl: 0, nlp: -1, nf: 2, nd: -2, nom: 1, ps: -4752.0, pst: -11.0, pc: -3.0, ec: 2719.0, ect: 0.0, es: -3.0 },
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: -2, nom: 1, ps: -4940.0, pst: -11.0, pc: -21.0, ec: 2720.0, ect: 0.0, es: -9.0 },
    NutationRow { nl: -1, nlp: -1, nf: 0, nd: 2, nom: 0, ps: 7350.0, pst: 0.0, pc: -8.0, ec: -51.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: 2, nlp: 0, nf: 0, nd: -2, nom: 1, ps: 4065.0, pst: 0.0, pc: 6.0, ec: -2206.0, ect: 0.0, es: 1.0 },
    NutationRow { nl: 1, nlp: 0, nf: 0, nd: 2, nom: 0, ps: 6579.0, pst: 0.0, pc: -24.0, ec: -199.0, ect: 0.0, es: 2.0 },
    NutationRow { nl: 0, nlp: 1, nf: 2, nd: -2, nom: 1, ps: 3579.0, pst: 0.0, pc: 5.0, ec: -1900.0, ect: 0.0, es: 1.0 },
    NutationRow { nl: 1, nlp: -1, nf: 0, nd: 0, nom: 0, ps: 4725.0, pst: 0.0, pc: -6.0, ec: -41.0, ect: 0.0, es: 3.0 },
    NutationRow { nl: -2, nlp: 0, nf: 2, nd: 0, nom: 2, ps: -3075.0, pst: 0.0, pc: -2.0, ec: 1313.0, ect: 0.0, es: -1.0 },
    NutationRow { nl: 3, nlp: 0, nf: 2, nd: 0, nom: 2, ps: -2904.0, pst: 0.0, pc: 15.0, ec: 1233.0, ect: 0.0, es: 7.0 },
    NutationRow { nl: 0, nlp: -1, nf: 0, nd: 2, nom: 0, ps: 4348.0, pst: 0.0, pc: -10.0, ec: -81.0, ect: 0.0, es: 2.0 },
    NutationRow { nl: 1, nlp: -1, nf: 2, nd: 0, nom: 2, ps: -2878.0, pst: 0.0, pc: 8.0, ec: 1232.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: 0, nlp: 0, nf: 0, nd: 1, nom: 0, ps: -4230.0, pst: 0.0, pc: 5.0, ec: -20.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: -1, nlp: -1, nf: 2, nd: 2, nom: 2, ps: -2819.0, pst: 0.0, pc: 7.0, ec: 1207.0, ect: 0.0, es: 3.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 0, nom: 0, ps: -4056.0, pst: 0.0, pc: 5.0, ec: 40.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: 0, nlp: -1, nf: 2, nd: 2, nom: 2, ps: -2647.0, pst: 0.0, pc: 11.0, ec: 1129.0, ect: 0.0, es: 5.0 },
    NutationRow { nl: -2, nlp: 0, nf: 0, nd: 0, nom: 1, ps: -2294.0, pst: 0.0, pc: -10.0, ec: 1266.0, ect: 0.0, es: -4.0 },
    NutationRow { nl: 1, nlp: 1, nf: 2, nd: 0, nom: 2, ps: 2481.0, pst: 0.0, pc: -7.0, ec: -1062.0, ect: 0.0, es: -3.0 },
    NutationRow { nl: 2, nlp: 0, nf: 0, nd: 0, nom: 1, ps: 2179.0, pst: 0.0, pc: -2.0, ec: -1129.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: -1, nlp: 1, nf: 0, nd: 1, nom: 0, ps: 3276.0, pst: 0.0, pc: 1.0, ec: -9.0, ect: 0.0, es: 0.0 },
    NutationRow { nl: 1, nlp: 1, nf: 0, nd: 0, nom: 0, ps: -3389.0, pst: 0.0, pc: 5.0, ec: 35.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: 0, nom: 0, ps: 3339.0, pst: 0.0, pc: -13.0, ec: -107.0, ect: 0.0, es: 1.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: -2, nom: 1, ps: -1987.0, pst: 0.0, pc: -6.0, ec: 1073.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: 1, nlp: 0, nf: 0, nd: 0, nom: 2, ps: -1981.0, pst: 0.0, pc: 0.0, ec: 854.0, ect: 0.0, es: 0.0 },
    NutationRow { nl: -1, nlp: 0, nf: 0, nd: 1, nom: 0, ps: 4026.0, pst: 0.0, pc: -353.0, ec: -553.0, ect: 0.0, es: -139.0 },
    NutationRow { nl: 0, nlp: 0, nf: 2, nd: 1, nom: 2, ps: 1660.0, pst: 0.0, pc: -5.0, ec: -710.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: -1, nlp: 0, nf: 2, nd: 4, nom: 2, ps: -1521.0, pst: 0.0, pc: 9.0, ec: 647.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: -1, nlp: 1, nf: 0, nd: 1, nom: 1, ps: 1314.0, pst: 0.0, pc: 0.0, ec: -700.0, ect: 0.0, es: 0.0 },
    NutationRow { nl: 0, nlp: -2, nf: 2, nd: -2, nom: 1, ps: -1283.0, pst: 0.0, pc: 0.0, ec: 672.0, ect: 0.0, es: 0.0 },
    NutationRow { nl: 1, nlp: 0, nf: 2, nd: 2, nom: 1, ps: -1331.0, pst: 0.0, pc: 8.0, ec: 663.0, ect: 0.0, es: 4.0 },
    NutationRow { nl: -2, nlp: 0, nf: 2, nd: 2, nom: 2, ps: 1383.0, pst: 0.0, pc: -2.0, ec: -594.0, ect: 0.0, es: -2.0 },
    NutationRow { nl: -1, nlp: 0, nf: 0, nd: 0, nom: 2, ps: 1405.0, pst: 0.0, pc: 4.0, ec: -610.0, ect: 0.0, es: 2.0 },
    NutationRow { nl: 1, nlp: 1, nf: 2, nd: -2, nom: 2, ps: 1290.0, pst: 0.0, pc: 0.0, ec: -556.0, ect: 0.0, es: 0.0 },
];

/// IAU 2000B nutation in longitude and obliquity, arcseconds.
fn iau2000b(time: AstroTime) -> (f64, f64) {
    let t = time.tt / 36525.0;
    let el = (485868.249036 + t * 1717915923.2178).rem_euclid(ASEC360) * ASEC2RAD;
    let elp = (1287104.79305 + t * 129596581.0481).rem_euclid(ASEC360) * ASEC2RAD;
    let f = (335779.526232 + t * 1739527262.8478).rem_euclid(ASEC360) * ASEC2RAD;
    let d = (1072260.70369 + t * 1602961601.2090).rem_euclid(ASEC360) * ASEC2RAD;
    let om = (450160.398036 - t * 6962890.5431).rem_euclid(ASEC360) * ASEC2RAD;
    let mut dp = 0.0;
    let mut de = 0.0;
    // Sum in ascending order of magnitude to limit roundoff.
    for row in IAU2000B.iter().rev() {
        let arg = f64::from(row.nl) * el
            + f64::from(row.nlp) * elp
            + f64::from(row.nf) * f
            + f64::from(row.nd) * d
            + f64::from(row.nom) * om;
        let (sarg, carg) = arg.sin_cos();
        dp += (row.ps + row.pst * t) * sarg + row.pc * carg;
        de += (row.ec + row.ect * t) * carg + row.es * sarg;
    }
    // 0.1 microarcsec units to arcsec, plus the fixed planetary-bias offsets.
    (-0.000135 + dp * 1.0e-7, 0.000388 + de * 1.0e-7)
}

/// Mean obliquity of the ecliptic in degrees (IAU 2006 polynomial).
pub fn mean_obliquity(time: AstroTime) -> f64 {
    let t = time.tt / 36525.0;
    let asec = 84381.406
        + t * (-46.836769
            + t * (-0.0001831
                + t * (0.00200340 + t * (-0.000000576 + t * (-0.0000000434)))));
    asec / 3600.0
}

/// Earth orientation angles at the given time: nutation components, mean and
/// true obliquity, and the equation of the equinoxes.
pub fn e_tilt(time: AstroTime) -> EarthTilt {
    let (dpsi, deps) = iau2000b(time);
    let mobl = mean_obliquity(time);
    let tobl = mobl + deps / 3600.0;
    let ee = dpsi * (mobl * DEG2RAD).cos() / 54000.0;
    EarthTilt {
        dpsi,
        deps,
        mobl,
        tobl,
        ee,
    }
}

/// IAU 2006 precession rotation between the J2000 mean equator and the mean
/// equator of date.
pub fn precession_matrix(time: AstroTime, direction: PrecessDirection) -> RotationMatrix {
    let t = time.tt / 36525.0;
    let eps0 = 84381.406 * ASEC2RAD;
    let psia = t
        * (5038.481507
            + t * (-1.0790069 + t * (-0.00114045 + t * (0.000132851 + t * (-0.0000000951)))))
        * ASEC2RAD;
    let omegaa = (84381.406
        + t * (-0.025754
            + t * (0.0512623 + t * (-0.00772503 + t * (-0.000000467 + t * (0.0000003337))))))
        * ASEC2RAD;
    let chia = t
        * (10.556403
            + t * (-2.3814292 + t * (-0.00121197 + t * (0.000170663 + t * (-0.0000000560)))))
        * ASEC2RAD;
    // Into the frame of date: R3(chi) R1(-omega) R3(-psi) R1(eps0).
    let into = rot_z(chia) * rot_x(-omegaa) * rot_z(-psia) * rot_x(eps0);
    match direction {
        PrecessDirection::From2000 => RotationMatrix { rot_mat: into },
        PrecessDirection::Into2000 => RotationMatrix {
            rot_mat: into.transpose(),
        },
    }
}

/// Nutation rotation between the mean equator of date and the true equator of
/// date.
pub fn nutation_matrix(time: AstroTime, direction: PrecessDirection) -> RotationMatrix {
    let tilt = e_tilt(time);
    let oblm = tilt.mobl * DEG2RAD;
    let oblt = tilt.tobl * DEG2RAD;
    let psi = tilt.dpsi * ASEC2RAD;
    let into = rot_x(-oblt) * rot_z(-psi) * rot_x(oblm);
    match direction {
        PrecessDirection::From2000 => RotationMatrix { rot_mat: into },
        PrecessDirection::Into2000 => RotationMatrix {
            rot_mat: into.transpose(),
        },
    }
}

/// Applies precession and nutation to a vector, in either direction.
///
/// The composition order flips with the direction because the two transforms
/// are mutual inverses.
pub fn gyration(vector: &AstroVector, time: AstroTime, direction: PrecessDirection) -> AstroVector {
    match direction {
        PrecessDirection::From2000 => nutation_matrix(time, direction)
            .rotate(&precession_matrix(time, direction).rotate(vector)),
        PrecessDirection::Into2000 => precession_matrix(time, direction)
            .rotate(&nutation_matrix(time, direction).rotate(vector)),
    }
}

/// Greenwich Apparent Sidereal Time in hours, in [0, 24).
pub fn sidereal_time(time: AstroTime) -> f64 {
    let t = time.tt / 36525.0;
    let ee_hours = e_tilt(time).ee;
    // ERA-based GMST polynomial (IAU 2006), arcseconds.
    let gmst_offset_asec = 0.014506
        + t * (4612.156534
            + t * (1.3915817 + t * (-0.00000044 + t * (-0.000029956 + t * (-0.0000000368)))));
    let st_deg = gmst_offset_asec / 3600.0 + 15.0 * ee_hours;
    let gst = ((st_deg + era(time)).rem_euclid(360.0)) / 15.0;
    if gst < 0.0 {
        gst + 24.0
    } else {
        gst
    }
}

#[cfg(test)]
mod ut_orientations {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tilt_at_j2000() {
        let tilt = e_tilt(AstroTime::from_ut(0.0));
        assert_abs_diff_eq!(tilt.dpsi, -13.93, epsilon = 0.02);
        assert_abs_diff_eq!(tilt.deps, -5.77, epsilon = 0.02);
        assert_abs_diff_eq!(tilt.mobl, 23.4392794, epsilon = 1e-6);
        assert!(tilt.tobl < tilt.mobl);
    }

    #[test]
    fn precession_matrices_are_inverses() {
        let t = AstroTime::from_ut(18262.5);
        let fwd = precession_matrix(t, PrecessDirection::From2000);
        let bwd = precession_matrix(t, PrecessDirection::Into2000);
        let prod = fwd.rot_mat * bwd.rot_mat;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(prod[(i, j)], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn gyration_round_trip() {
        let t = AstroTime::from_ut(8000.0);
        let v = AstroVector::new(0.3, -0.7, 0.64, t);
        let there = gyration(&v, t, PrecessDirection::From2000);
        let back = gyration(&there, t, PrecessDirection::Into2000);
        assert_abs_diff_eq!((back.pos - v.pos).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn gast_at_j2000() {
        let gst = sidereal_time(AstroTime::from_ut(0.0));
        assert_abs_diff_eq!(gst, 18.697138, epsilon = 1e-4);
    }

    #[test]
    fn gast_stays_in_range() {
        for i in 0..500 {
            let gst = sidereal_time(AstroTime::from_ut(f64::from(i) * 13.77));
            assert!((0.0..24.0).contains(&gst));
        }
    }
}
