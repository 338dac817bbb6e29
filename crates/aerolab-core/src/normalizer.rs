//! Raw coordinate text to canonical airfoil ordering.
//!
//! Accepts both common airfoil file layouts:
//!
//! - **Selig**: one continuous loop, trailing edge → upper surface → leading
//!   edge → lower surface → trailing edge.
//! - **Lednicer**: two independent sections (upper, then lower), each
//!   usually listed outward from the leading edge.
//!
//! The output is always the Selig ordering the solver expects. Normalizing
//! already-canonical coordinates returns them unchanged.

use tracing::debug;

use crate::errors::InputValidationError;
use crate::geometry::{max_x_index, min_x_index, CanonicalAirfoil, Point};
use crate::options::NormalizerOptions;

/// Detected layout of a parsed coordinate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One continuous loop around the airfoil.
    SingleLoop,
    /// Two sections; the second one starts at `break_at`.
    TwoSection { break_at: usize },
}

/// Pure, deterministic geometry normalizer.
#[derive(Debug, Clone, Default)]
pub struct GeometryNormalizer {
    options: NormalizerOptions,
}

impl GeometryNormalizer {
    /// Create a normalizer with the given options.
    #[must_use]
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            options: options.normalize(),
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Normalize an uploaded payload.
    ///
    /// The size limit is enforced before decoding; invalid UTF-8 sequences
    /// are replaced and then fail numeric parsing like any other junk.
    pub fn normalize_bytes(&self, raw: &[u8]) -> Result<CanonicalAirfoil, InputValidationError> {
        self.check_size(raw.len())?;
        self.normalize(&String::from_utf8_lossy(raw))
    }

    /// Normalize raw coordinate text.
    pub fn normalize(&self, raw: &str) -> Result<CanonicalAirfoil, InputValidationError> {
        let points = self.parse_points(raw)?;
        self.normalize_points(points)
    }

    /// Parse an uploaded payload into in-domain points, in file order.
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<Vec<Point>, InputValidationError> {
        self.check_size(raw.len())?;
        self.parse_points(&String::from_utf8_lossy(raw))
    }

    /// Parse raw text into in-domain points, in file order.
    pub fn parse_points(&self, raw: &str) -> Result<Vec<Point>, InputValidationError> {
        self.check_size(raw.len())?;

        let points: Vec<Point> = raw
            .lines()
            .filter_map(parse_pair)
            .filter(|p| self.options.accepts(p.x, p.y))
            .collect();

        self.check_count(points.len())?;
        Ok(points)
    }

    /// Reorder already-parsed points into canonical form.
    pub fn normalize_points(
        &self,
        points: Vec<Point>,
    ) -> Result<CanonicalAirfoil, InputValidationError> {
        self.check_count(points.len())?;

        let layout = self.detect_layout(&points);
        let input_len = points.len();
        let ordered = match layout {
            Layout::TwoSection { break_at } => self.join_sections(&points, break_at),
            Layout::SingleLoop => self.orient_loop(points),
        };
        let cleaned = self.remove_coincident(ordered);

        debug!(
            ?layout,
            input_points = input_len,
            output_points = cleaned.len(),
            "Normalized airfoil geometry"
        );

        if cleaned.len() < self.options.min_points {
            return Err(InputValidationError::InsufficientPoints {
                found: cleaned.len(),
                min: self.options.min_points,
            });
        }
        Ok(CanonicalAirfoil::from_normalized(cleaned))
    }

    /// Look for a section break between two independently listed surfaces.
    ///
    /// A break is a jump across the whole chord (from beyond `break_high_x`
    /// to below `break_low_x`, or the reverse) where the preceding step ran
    /// the other way. The direction check keeps a coarse but continuous loop
    /// from being read as two sections.
    #[must_use]
    pub fn detect_layout(&self, points: &[Point]) -> Layout {
        let lo = self.options.break_low_x;
        let hi = self.options.break_high_x;

        for i in 2..points.len() {
            let prev = points[i - 2].x;
            let a = points[i - 1].x;
            let b = points[i].x;

            let returns_to_origin = a > hi && b < lo && prev <= a;
            let returns_to_tail = a < lo && b > hi && prev >= a;
            if returns_to_origin || returns_to_tail {
                return Layout::TwoSection { break_at: i };
            }
        }
        Layout::SingleLoop
    }

    fn join_sections(&self, points: &[Point], break_at: usize) -> Vec<Point> {
        let mut upper = points[..break_at].to_vec();
        let mut lower = points[break_at..].to_vec();

        // Upper runs TE -> LE, lower runs LE -> TE.
        if runs_forward(&upper) {
            upper.reverse();
        }
        if !runs_forward(&lower) {
            lower.reverse();
        }

        let shared_le = match (upper.last(), lower.first()) {
            (Some(u), Some(l)) => u.coincides(l, self.options.epsilon),
            _ => false,
        };
        let skip = usize::from(shared_le);

        upper.extend_from_slice(&lower[skip..]);
        upper
    }

    fn orient_loop(&self, points: Vec<Point>) -> Vec<Point> {
        let te = max_x_index(&points);
        let x_max = points[te].x;
        let chord = x_max - points[min_x_index(&points)].x;
        let tolerance = self.options.trailing_edge_tolerance * chord.max(f64::EPSILON);

        if x_max - points[0].x <= tolerance {
            let mut ordered = points;
            // Upper surface first means counter-clockwise.
            if signed_area(&ordered) < 0.0 {
                ordered.reverse();
            }
            return ordered;
        }

        // The loop starts away from the trailing edge; restart it there.
        let mut rotated = Vec::with_capacity(points.len());
        rotated.extend_from_slice(&points[te..]);
        rotated.extend_from_slice(&points[..te]);
        if signed_area(&rotated) < 0.0 {
            rotated[1..].reverse();
        }
        rotated
    }

    fn remove_coincident(&self, points: Vec<Point>) -> Vec<Point> {
        let eps = self.options.epsilon;
        let mut out: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            match out.last() {
                Some(last) if last.coincides(&p, eps) => {}
                _ => out.push(p),
            }
        }
        // Closed trailing edge listed twice.
        if out.len() > 1 && out[0].coincides(&out[out.len() - 1], eps) {
            out.pop();
        }
        out
    }

    fn check_size(&self, size: usize) -> Result<(), InputValidationError> {
        if size > self.options.max_bytes {
            return Err(InputValidationError::PayloadTooLarge {
                size,
                max: self.options.max_bytes,
            });
        }
        Ok(())
    }

    fn check_count(&self, found: usize) -> Result<(), InputValidationError> {
        if found < self.options.min_points {
            return Err(InputValidationError::InsufficientPoints {
                found,
                min: self.options.min_points,
            });
        }
        if found > self.options.max_points {
            return Err(InputValidationError::TooManyPoints {
                found,
                max: self.options.max_points,
            });
        }
        Ok(())
    }
}

/// Parse the first two whitespace-separated columns of a line.
fn parse_pair(line: &str) -> Option<Point> {
    let mut cols = line.split_whitespace();
    let x: f64 = cols.next()?.parse().ok()?;
    let y: f64 = cols.next()?.parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some(Point::new(x, y))
}

/// Shoelace area of the closed loop; positive when counter-clockwise.
fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

fn runs_forward(section: &[Point]) -> bool {
    match (section.first(), section.last()) {
        (Some(first), Some(last)) => first.x < last.x,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(n: usize, sign: f64) -> Vec<Point> {
        // Cosine-spaced half of a symmetric 12% section, LE -> TE.
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 / (n - 1) as f64;
                let x = 0.5 * (1.0 - (std::f64::consts::PI * t).cos());
                let y = 0.6
                    * (0.2969 * x.sqrt() - 0.126 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
                        - 0.1015 * x.powi(4));
                Point::new(x, sign * y)
            })
            .collect()
    }

    fn selig(n: usize) -> Vec<Point> {
        let mut upper = surface(n, 1.0);
        upper.reverse();
        let lower = surface(n, -1.0);
        upper.extend_from_slice(&lower[1..]);
        upper
    }

    fn render(points: &[Point], header: &str) -> String {
        let mut out = String::from(header);
        out.push('\n');
        for p in points {
            out.push_str(&format!("{:.6} {:.6}\n", p.x, p.y));
        }
        out
    }

    #[test]
    fn parse_skips_headers_and_junk() {
        let text = "NACA 0012\n\n1.0 0.0\nfoo bar\n0.5 0.05 extra\n0.0 0.0\n";
        let n = GeometryNormalizer::new(NormalizerOptions {
            min_points: 3,
            ..Default::default()
        });
        let pts = n.parse_points(text).unwrap();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[1], Point::new(0.5, 0.05));
    }

    #[test]
    fn parse_drops_out_of_domain_and_non_finite() {
        let mut text = render(&selig(20), "X");
        text.push_str("61. 61.\nNaN 0.0\n0.5 inf\n");
        let n = GeometryNormalizer::default();
        assert_eq!(n.parse_points(&text).unwrap().len(), 39);
    }

    #[test]
    fn five_points_is_insufficient() {
        let text = "1 0\n0.5 0.05\n0 0\n0.5 -0.05\n1 -0.001\n";
        let err = GeometryNormalizer::default().normalize(text).unwrap_err();
        assert_eq!(
            err,
            InputValidationError::InsufficientPoints { found: 5, min: 10 }
        );
    }

    #[test]
    fn too_many_points() {
        let text = render(&selig(300), "BIG");
        let err = GeometryNormalizer::default().normalize(&text).unwrap_err();
        assert!(matches!(
            err,
            InputValidationError::TooManyPoints { found: 599, max: 500 }
        ));
    }

    #[test]
    fn oversized_payload_rejected_before_parsing() {
        let n = GeometryNormalizer::new(NormalizerOptions {
            max_bytes: 16,
            ..Default::default()
        });
        let err = n.normalize_bytes(&[b'1'; 17]).unwrap_err();
        assert!(err.is_payload_too_large());
        assert!(n.parse_bytes(&[b'1'; 17]).unwrap_err().is_payload_too_large());
    }

    #[test]
    fn selig_input_is_unchanged() {
        let pts = selig(30);
        let airfoil = GeometryNormalizer::default()
            .normalize_points(pts.clone())
            .unwrap();
        assert_eq!(airfoil.points(), pts.as_slice());
    }

    #[test]
    fn lednicer_outward_sections() {
        let upper = surface(25, 1.0);
        let lower = surface(25, -1.0);
        let mut raw = upper.clone();
        raw.extend_from_slice(&lower);

        let n = GeometryNormalizer::default();
        assert_eq!(n.detect_layout(&raw), Layout::TwoSection { break_at: 25 });

        let airfoil = n.normalize_points(raw).unwrap();
        // Shared leading edge dropped once.
        assert_eq!(airfoil.len(), 49);
        assert!((airfoil.points()[0].x - 1.0).abs() < 1e-9);
        assert!((airfoil.points()[48].x - 1.0).abs() < 1e-9);
        assert_eq!(airfoil.leading_edge_index(), 24);
    }

    #[test]
    fn lednicer_sections_both_toward_leading_edge() {
        let mut upper = surface(20, 1.0);
        upper.reverse();
        let mut lower = surface(20, -1.0);
        lower.reverse();
        let mut raw = upper;
        raw.extend_from_slice(&lower);

        let n = GeometryNormalizer::default();
        assert_eq!(n.detect_layout(&raw), Layout::TwoSection { break_at: 20 });
        let airfoil = n.normalize_points(raw).unwrap();
        assert_eq!(airfoil.len(), 39);
        assert!(airfoil.points()[1].y > 0.0);
        assert!(airfoil.points()[airfoil.len() - 2].y < 0.0);
    }

    #[test]
    fn loop_starting_at_leading_edge_is_rotated() {
        // LE -> lower -> TE -> upper -> (just short of) LE
        let mut raw = surface(20, -1.0);
        let mut upper = surface(20, 1.0);
        upper.reverse();
        raw.extend_from_slice(&upper[1..upper.len() - 1]);

        let n = GeometryNormalizer::default();
        assert_eq!(n.detect_layout(&raw), Layout::SingleLoop);
        let airfoil = n.normalize_points(raw).unwrap();
        assert!((airfoil.points()[0].x - 1.0).abs() < 1e-9);
        let le = airfoil.leading_edge_index();
        assert!(airfoil.upper().windows(2).all(|w| w[0].x >= w[1].x));
        assert!(airfoil.lower().windows(2).all(|w| w[0].x <= w[1].x));
        assert!(airfoil.points()[le].x.abs() < 1e-9);
    }

    #[test]
    fn loop_starting_at_leading_edge_upper_first_is_rotated() {
        // LE -> upper -> TE -> lower -> (just short of) LE, cambered.
        let camber = |p: Point| Point::new(p.x, p.y + 0.04 * p.x * (1.0 - p.x));
        let mut raw: Vec<Point> = surface(20, 1.0).into_iter().map(camber).collect();
        let mut lower: Vec<Point> = surface(20, -1.0).into_iter().map(camber).collect();
        lower.reverse();
        raw.extend_from_slice(&lower[1..lower.len() - 1]);

        let n = GeometryNormalizer::default();
        assert_eq!(n.detect_layout(&raw), Layout::SingleLoop);
        let airfoil = n.normalize_points(raw).unwrap();
        let pts = airfoil.points();
        assert!(pts[0].x > 0.99);
        assert!(pts[pts.len() - 1].x > 0.99);
        assert!(pts[1].y > 0.0);
        assert!(pts[pts.len() - 2].y < 0.0);
        assert!(airfoil.upper().iter().all(|p| p.y >= 0.0));
        assert!(airfoil.upper().windows(2).all(|w| w[0].x >= w[1].x));
        assert!(airfoil.lower().windows(2).all(|w| w[0].x <= w[1].x));
        assert!(airfoil.points()[airfoil.leading_edge_index()].x.abs() < 1e-9);
    }

    #[test]
    fn clockwise_loop_from_trailing_edge_is_reversed() {
        let mut pts = selig(20);
        pts.reverse();
        let airfoil = GeometryNormalizer::default().normalize_points(pts).unwrap();
        assert_eq!(airfoil.points(), selig(20).as_slice());
    }

    #[test]
    fn duplicate_trailing_edge_removed() {
        let mut pts = selig(15);
        pts.push(pts[0]);
        let airfoil = GeometryNormalizer::default().normalize_points(pts).unwrap();
        assert_eq!(airfoil.len(), 29);
    }

    #[test]
    fn coarse_canonical_loop_is_stable() {
        let pts = vec![
            Point::new(1.0, 0.0),
            Point::new(0.9, 0.02),
            Point::new(0.8, 0.04),
            Point::new(0.6, 0.06),
            Point::new(0.0, 0.0),
            Point::new(0.6, -0.06),
            Point::new(0.8, -0.04),
            Point::new(0.9, -0.02),
            Point::new(0.95, -0.01),
            Point::new(1.0, -0.002),
        ];
        let n = GeometryNormalizer::default();
        let once = n.normalize_points(pts.clone()).unwrap();
        assert_eq!(once.points(), pts.as_slice());
        let twice = n.normalize_points(once.points().to_vec()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn text_round_trip_is_idempotent() {
        let text = render(&selig(40), "NACA 0012");
        let n = GeometryNormalizer::default();
        let once = n.normalize(&text).unwrap();
        let twice = n.normalize(&once.to_dat("NACA 0012")).unwrap();
        assert_eq!(once, twice);
    }
}
