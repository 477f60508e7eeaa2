//! Template-fill generation of identifiers.
//!
//! Both kinds share one pass over the 36 body slots: separators at 8, 13, 18 and 23, the
//! version digit `4` at 14, a variant digit drawn from four values at 19, and a uniform hex
//! digit everywhere else. The braced kind switches to the uppercase alphabet and adds `{` `}`.

use crate::identifier::{
    Identifier, BODY_LEN, HYPHEN_POSITIONS, VARIANT_POSITION, VERSION_POSITION,
};
use crate::{IdentifierError, IdentifierKind, IdentifierResult};
use rand::rngs::{OsRng, ThreadRng};
use rand::RngCore;

const LOWER_HEX: &[u8; 16] = b"0123456789abcdef";
const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Offset into the hex alphabet of the first variant digit (`8`, binary `10xx`).
const VARIANT_BASE: u8 = 8;

/// A source of uniformly distributed small integers.
///
/// The generator only ever asks for `bound` values of 16 (hex digits) and 4 (variant digit).
pub trait RandomSource {
    /// Returns a value drawn uniformly from `0..bound`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidInput`] if `bound` is zero, or
    /// [`IdentifierError::RandomnessUnavailable`] if the underlying source cannot be read.
    fn draw(&mut self, bound: u8) -> IdentifierResult<u8>;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
        (**self).draw(bound)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
        (**self).draw(bound)
    }
}

/// Adapts any [`rand::RngCore`] into a [`RandomSource`].
///
/// Each draw reads one byte and reduces it modulo `bound`. Bytes at or above the largest
/// multiple of `bound` below 256 are discarded and redrawn, so every bound in `1..=255` is
/// uniform. For 16 and 4 nothing is ever discarded.
#[derive(Clone, Debug, Default)]
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
        if bound == 0 {
            return Err(IdentifierError::InvalidInput(
                "draw bound must be at least 1".into(),
            ));
        }

        let bound = u16::from(bound);
        let zone = 256 - 256 % bound;
        let mut byte = [0u8; 1];
        loop {
            self.0
                .try_fill_bytes(&mut byte)
                .map_err(|e| IdentifierError::RandomnessUnavailable(e.to_string()))?;
            let value = u16::from(byte[0]);
            if value < zone {
                // value % bound < bound <= 255
                return Ok((value % bound) as u8);
            }
        }
    }
}

/// Produces fresh identifiers from an owned [`RandomSource`].
///
/// The generator keeps no record of what it has issued. Each call is independent; two calls
/// differ with overwhelming probability but nothing enforces uniqueness.
///
/// # Construction
/// - [`IdentifierGenerator::thread`] uses the thread-local PRNG.
/// - [`IdentifierGenerator::os`] reads the operating system's entropy source.
/// - [`IdentifierGenerator::new`] accepts any source, for example a seeded RNG in tests.
#[derive(Clone, Debug)]
pub struct IdentifierGenerator<S> {
    source: S,
}

impl IdentifierGenerator<RngSource<ThreadRng>> {
    pub fn thread() -> Self {
        Self::new(RngSource::new(rand::thread_rng()))
    }
}

impl Default for IdentifierGenerator<RngSource<ThreadRng>> {
    fn default() -> Self {
        Self::thread()
    }
}

impl IdentifierGenerator<RngSource<OsRng>> {
    pub fn os() -> Self {
        Self::new(RngSource::new(OsRng))
    }
}

impl<S: RandomSource> IdentifierGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Generates one identifier of `kind`.
    ///
    /// # Arguments
    ///
    /// * `kind` - Format to generate.
    ///
    /// # Returns
    ///
    /// Returns a new [`Identifier`] laid out for `kind`, filled from this generator's source.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::RandomnessUnavailable`] if the source fails or returns an
    /// out-of-range value. No partial identifier is ever returned.
    pub fn generate(&mut self, kind: IdentifierKind) -> IdentifierResult<Identifier> {
        let alphabet = if kind.is_uppercase() {
            UPPER_HEX
        } else {
            LOWER_HEX
        };

        let mut text = String::with_capacity(kind.text_len());
        if kind.is_braced() {
            text.push('{');
        }

        for slot in 0..BODY_LEN {
            let c = match slot {
                s if HYPHEN_POSITIONS.contains(&s) => '-',
                VERSION_POSITION => '4',
                VARIANT_POSITION => {
                    let bits = self.draw(4)?;
                    char::from(alphabet[usize::from(VARIANT_BASE + bits)])
                }
                _ => char::from(alphabet[usize::from(self.draw(16)?)]),
            };
            text.push(c);
        }

        if kind.is_braced() {
            text.push('}');
        }

        tracing::debug!(%kind, "generated identifier");
        Ok(Identifier::from_generated(kind, text))
    }

    /// Generates `count` identifiers of `kind`.
    ///
    /// Either all `count` identifiers are returned or none are.
    ///
    /// # Arguments
    ///
    /// * `kind` - Format of every generated identifier.
    /// * `count` - Number of identifiers to generate. Must be at least 1.
    ///
    /// # Returns
    ///
    /// Returns `count` freshly generated identifiers in generation order.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidInput`] if `count` is zero, or the first
    /// [`IdentifierError::RandomnessUnavailable`] encountered.
    pub fn generate_many(
        &mut self,
        kind: IdentifierKind,
        count: usize,
    ) -> IdentifierResult<Vec<Identifier>> {
        if count == 0 {
            return Err(IdentifierError::InvalidInput(
                "count must be at least 1".into(),
            ));
        }
        (0..count).map(|_| self.generate(kind)).collect()
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
        let value = self.source.draw(bound)?;
        if value >= bound {
            return Err(IdentifierError::RandomnessUnavailable(format!(
                "source returned {value} for a draw below {bound}"
            )));
        }
        Ok(value)
    }
}

/// Generates one identifier of `kind` using the thread-local PRNG.
///
/// # Errors
///
/// Returns [`IdentifierError::RandomnessUnavailable`] if the PRNG cannot be read.
pub fn generate(kind: IdentifierKind) -> IdentifierResult<Identifier> {
    IdentifierGenerator::thread().generate(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;
    use std::collections::HashSet;

    const STANDARD_PATTERN: &str =
        r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
    const BRACED_PATTERN: &str =
        r"^\{[0-9A-F]{8}-[0-9A-F]{4}-4[0-9A-F]{3}-[89AB][0-9A-F]{3}-[0-9A-F]{12}\}$";

    /// Returns the draw counter reduced by the bound, so output positions are predictable.
    #[derive(Default)]
    struct CountingSource {
        draws: u32,
    }

    impl RandomSource for CountingSource {
        fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
            let value = (self.draws % u32::from(bound)) as u8;
            self.draws += 1;
            Ok(value)
        }
    }

    /// Always returns the largest value allowed by the bound.
    struct MaxSource;

    impl RandomSource for MaxSource {
        fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
            Ok(bound - 1)
        }
    }

    /// Succeeds for `remaining` draws, then fails.
    struct FailingSource {
        remaining: usize,
    }

    impl RandomSource for FailingSource {
        fn draw(&mut self, _bound: u8) -> IdentifierResult<u8> {
            if self.remaining == 0 {
                return Err(IdentifierError::RandomnessUnavailable("exhausted".into()));
            }
            self.remaining -= 1;
            Ok(0)
        }
    }

    struct OutOfRangeSource;

    impl RandomSource for OutOfRangeSource {
        fn draw(&mut self, bound: u8) -> IdentifierResult<u8> {
            Ok(bound)
        }
    }

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    /// Hands out a fixed byte sequence, then fails.
    struct ScriptedRng {
        bytes: Vec<u8>,
        next: usize,
    }

    impl ScriptedRng {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            for b in dest.iter_mut() {
                match self.bytes.get(self.next) {
                    Some(value) => *b = *value,
                    None => return Err(rand::Error::new("script exhausted")),
                }
                self.next += 1;
            }
            Ok(())
        }
    }

    #[test]
    fn test_rng_source_rejects_zero_bound() {
        let mut source = RngSource::new(StdRng::seed_from_u64(1));
        let result = source.draw(0);

        match result {
            Err(IdentifierError::InvalidInput(msg)) => assert!(msg.contains("at least 1")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_rng_source_redraws_bytes_outside_uniform_zone() {
        // 256 % 3 == 1, so byte 255 is discarded
        let mut source = RngSource::new(ScriptedRng::new(&[255, 4, 254]));

        assert_eq!(source.draw(3).unwrap(), 1);
        assert_eq!(source.draw(3).unwrap(), 2);
        assert_eq!(source.into_inner().next, 3);

        // 256 % 10 == 6, so bytes 250..=255 are discarded
        let mut source = RngSource::new(ScriptedRng::new(&[250, 255, 9]));
        assert_eq!(source.draw(10).unwrap(), 9);
    }

    #[test]
    fn test_rng_source_never_discards_for_generator_bounds() {
        let mut source = RngSource::new(ScriptedRng::new(&[255, 255, 0]));

        assert_eq!(source.draw(16).unwrap(), 15);
        assert_eq!(source.draw(4).unwrap(), 3);
        assert_eq!(source.draw(16).unwrap(), 0);
    }

    #[test]
    fn test_rng_source_non_dividing_bound_is_uniform() {
        let mut source = RngSource::new(StdRng::seed_from_u64(1));
        let mut counts = [0u32; 3];
        for _ in 0..300_000 {
            counts[usize::from(source.draw(3).unwrap())] += 1;
        }

        // expected 100_000 each; modulo bias alone would push slot 0 about 1_200 above
        for count in counts {
            assert!((99_000..=101_000).contains(&count), "counts {:?}", counts);
        }
    }

    #[test]
    fn test_rng_source_exhausted_while_redrawing() {
        let mut source = RngSource::new(ScriptedRng::new(&[255]));

        assert!(matches!(
            source.draw(3),
            Err(IdentifierError::RandomnessUnavailable(_))
        ));
    }

    #[test]
    fn test_generate_standard_layout_from_counting_source() {
        let mut generator = IdentifierGenerator::new(CountingSource::default());
        let id = generator.generate(IdentifierKind::Standard).unwrap();

        assert_eq!(id.as_str(), "01234567-89ab-4cde-b012-3456789abcde");
        assert_eq!(id.kind(), IdentifierKind::Standard);
    }

    #[test]
    fn test_generate_braced_layout_from_counting_source() {
        let mut generator = IdentifierGenerator::new(CountingSource::default());
        let id = generator.generate(IdentifierKind::BracedUppercase).unwrap();

        assert_eq!(id.as_str(), "{01234567-89AB-4CDE-B012-3456789ABCDE}");
        assert_eq!(id.kind(), IdentifierKind::BracedUppercase);
    }

    #[test]
    fn test_generate_consumes_thirty_one_draws() {
        let mut generator = IdentifierGenerator::new(CountingSource::default());
        generator.generate(IdentifierKind::Standard).unwrap();

        assert_eq!(generator.into_source().draws, 31);
    }

    #[test]
    fn test_generate_extreme_draws() {
        let mut generator = IdentifierGenerator::new(MaxSource);

        assert_eq!(
            generator.generate(IdentifierKind::Standard).unwrap().as_str(),
            "ffffffff-ffff-4fff-bfff-ffffffffffff"
        );
        assert_eq!(
            generator
                .generate(IdentifierKind::BracedUppercase)
                .unwrap()
                .as_str(),
            "{FFFFFFFF-FFFF-4FFF-BFFF-FFFFFFFFFFFF}"
        );

        let mut generator = IdentifierGenerator::new(FailingSource { remaining: 31 });
        assert_eq!(
            generator.generate(IdentifierKind::Standard).unwrap().as_str(),
            "00000000-0000-4000-8000-000000000000"
        );
    }

    #[test]
    fn test_generate_matches_standard_pattern() {
        let pattern = Regex::new(STANDARD_PATTERN).unwrap();
        let mut generator = IdentifierGenerator::thread();

        for _ in 0..1_000 {
            let id = generator.generate(IdentifierKind::Standard).unwrap();
            assert_eq!(id.as_str().len(), 36);
            assert!(pattern.is_match(id.as_str()), "unexpected '{}'", id);
        }
    }

    #[test]
    fn test_generate_matches_braced_pattern() {
        let pattern = Regex::new(BRACED_PATTERN).unwrap();
        let mut generator = IdentifierGenerator::thread();

        for _ in 0..1_000 {
            let id = generator.generate(IdentifierKind::BracedUppercase).unwrap();
            assert_eq!(id.as_str().len(), 38);
            assert!(pattern.is_match(id.as_str()), "unexpected '{}'", id);
        }
    }

    #[test]
    fn test_generate_positional_rules() {
        let mut generator = IdentifierGenerator::thread();

        for _ in 0..200 {
            let id = generator.generate(IdentifierKind::Standard).unwrap();
            let bytes = id.as_str().as_bytes();
            for (i, b) in bytes.iter().enumerate() {
                match i {
                    8 | 13 | 18 | 23 => assert_eq!(*b, b'-'),
                    14 => assert_eq!(*b, b'4'),
                    19 => assert!(b"89ab".contains(b)),
                    _ => assert!(b.is_ascii_hexdigit() && !b.is_ascii_uppercase()),
                }
            }
        }
    }

    #[test]
    fn test_generate_covers_all_variant_digits() {
        let mut generator = IdentifierGenerator::thread();
        let variants: HashSet<u8> = (0..2_000)
            .map(|_| {
                generator
                    .generate(IdentifierKind::Standard)
                    .unwrap()
                    .as_str()
                    .as_bytes()[19]
            })
            .collect();

        assert_eq!(variants, HashSet::from([b'8', b'9', b'a', b'b']));
    }

    #[test]
    fn test_generate_covers_all_hex_digits() {
        let mut generator = IdentifierGenerator::thread();
        let mut lower = HashSet::new();
        let mut upper = HashSet::new();
        for _ in 0..200 {
            let id = generator.generate(IdentifierKind::Standard).unwrap();
            lower.extend(random_slots(id.as_str()));
            let id = generator.generate(IdentifierKind::BracedUppercase).unwrap();
            upper.extend(random_slots(&id.as_str()[1..37]));
        }

        assert_eq!(lower, LOWER_HEX.iter().copied().collect::<HashSet<u8>>());
        assert_eq!(upper, UPPER_HEX.iter().copied().collect::<HashSet<u8>>());
    }

    fn random_slots(body: &str) -> Vec<u8> {
        body.bytes()
            .enumerate()
            .filter(|(i, _)| !matches!(i, 8 | 13 | 14 | 18 | 19 | 23))
            .map(|(_, b)| b)
            .collect()
    }

    #[test]
    fn test_successive_calls_differ() {
        let mut generator = IdentifierGenerator::thread();
        let first = generator.generate(IdentifierKind::Standard).unwrap();
        let second = generator.generate(IdentifierKind::Standard).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_generated_values_are_distinct() {
        let ids = IdentifierGenerator::thread()
            .generate_many(IdentifierKind::BracedUppercase, 5_000)
            .unwrap();
        let unique: HashSet<_> = ids.iter().collect();

        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_generated_value_parses_back() {
        for kind in IdentifierKind::ALL {
            let id = generate(kind).unwrap();
            let parsed = Identifier::parse(id.as_str()).unwrap();

            assert_eq!(parsed, id);
            assert_eq!(parsed.to_uuid().get_version_num(), 4);
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = IdentifierGenerator::new(RngSource::new(StdRng::seed_from_u64(7)));
        let mut b = IdentifierGenerator::new(RngSource::new(StdRng::seed_from_u64(7)));

        assert_eq!(
            a.generate(IdentifierKind::Standard).unwrap(),
            b.generate(IdentifierKind::Standard).unwrap()
        );
    }

    #[test]
    fn test_os_generator() {
        let id = IdentifierGenerator::os()
            .generate(IdentifierKind::Standard)
            .unwrap();

        assert!(Regex::new(STANDARD_PATTERN).unwrap().is_match(id.as_str()));
    }

    #[test]
    fn test_rng_failure_is_randomness_unavailable() {
        let mut generator = IdentifierGenerator::new(RngSource::new(BrokenRng));
        let result = generator.generate(IdentifierKind::Standard);

        match result {
            Err(IdentifierError::RandomnessUnavailable(msg)) => {
                assert!(msg.contains("entropy source offline"));
            }
            _ => panic!("Expected RandomnessUnavailable error"),
        }
    }

    #[test]
    fn test_out_of_range_draw_is_rejected() {
        let mut generator = IdentifierGenerator::new(OutOfRangeSource);

        assert!(matches!(
            generator.generate(IdentifierKind::BracedUppercase),
            Err(IdentifierError::RandomnessUnavailable(_))
        ));
    }

    #[test]
    fn test_generate_many_is_all_or_nothing() {
        // enough for one identifier and a half
        let mut generator = IdentifierGenerator::new(FailingSource { remaining: 45 });
        let result = generator.generate_many(IdentifierKind::Standard, 3);

        assert!(matches!(
            result,
            Err(IdentifierError::RandomnessUnavailable(_))
        ));
    }

    #[test]
    fn test_generate_many_count() {
        let ids = IdentifierGenerator::new(CountingSource::default())
            .generate_many(IdentifierKind::Standard, 4)
            .unwrap();

        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| id.kind() == IdentifierKind::Standard));
    }

    #[test]
    fn test_generate_many_rejects_zero() {
        let result = IdentifierGenerator::thread().generate_many(IdentifierKind::Standard, 0);

        match result {
            Err(IdentifierError::InvalidInput(msg)) => assert!(msg.contains("at least 1")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_boxed_source() {
        let source: Box<dyn RandomSource> = Box::new(MaxSource);
        let mut generator = IdentifierGenerator::new(source);

        assert!(generator.generate(IdentifierKind::Standard).is_ok());
    }
}
