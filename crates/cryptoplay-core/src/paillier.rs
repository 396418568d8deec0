//! Paillier encryption, the additively homomorphic scheme behind the
//! "add two encrypted numbers" playground.
//!
//! Uses the simplified generator `g = n + 1`, so `g^m mod n² = 1 + m·n` and
//! `μ = λ⁻¹ mod n`. Big integer arithmetic comes from `num-bigint`, prime
//! generation from `glass_pumpkin`.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlaygroundError;

/// Modulus size used by the playground when none is given.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

const MIN_MODULUS_BITS: usize = 128;

/// Encryption and ciphertext addition under a public key.
pub trait AdditiveHomomorphic {
    type Plaintext;
    type Ciphertext;

    fn encrypt(&self, plaintext: &Self::Plaintext) -> Result<Self::Ciphertext, PlaygroundError>;

    /// Combine two ciphertexts into an encryption of the sum of their plaintexts.
    fn add(
        &self,
        left: &Self::Ciphertext,
        right: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, PlaygroundError>;
}

/// Public half: the modulus `n` (and cached `n²`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierPublicKey {
    n: BigUint,
    n_squared: BigUint,
}

/// Private half: `λ = lcm(p-1, q-1)` and `μ = λ⁻¹ mod n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierPrivateKey {
    lambda: BigUint,
    mu: BigUint,
    public: PaillierPublicKey,
}

/// Decimal rendering of a key pair, the way the playground displays it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaillierKeyView {
    pub bits: u64,
    pub n: String,
    pub lambda: String,
    pub mu: String,
}

/// Generate a key pair whose modulus has `bits` bits.
pub fn generate_keypair(
    bits: usize,
) -> Result<(PaillierPublicKey, PaillierPrivateKey), PlaygroundError> {
    if bits < MIN_MODULUS_BITS || bits % 2 != 0 {
        return Err(PlaygroundError::InvalidModulusSize(bits));
    }

    let prime_bits = bits / 2;
    loop {
        let p = random_prime(prime_bits)?;
        let q = random_prime(prime_bits)?;
        if p == q {
            continue;
        }
        let n = &p * &q;
        // both primes carry their top bit, but the product may still fall one short
        if n.bits() != bits as u64 {
            continue;
        }
        let one = BigUint::one();
        let p1 = &p - &one;
        let q1 = &q - &one;
        if !n.gcd(&(&p1 * &q1)).is_one() {
            continue;
        }
        let lambda = p1.lcm(&q1);
        let Some(mu) = lambda.modinv(&n) else {
            continue;
        };

        let public = PaillierPublicKey::new(n)?;
        debug!(bits, "generated paillier key pair");
        let private = PaillierPrivateKey {
            lambda,
            mu,
            public: public.clone(),
        };
        return Ok((public, private));
    }
}

fn random_prime(bits: usize) -> Result<BigUint, PlaygroundError> {
    glass_pumpkin::prime::new(bits)
        .map_err(|err| PlaygroundError::KeyGeneration(format!("prime generation: {err:?}")))
}

impl PaillierPublicKey {
    /// Rebuild a public key from its modulus.
    ///
    /// The modulus must be odd and greater than one.
    pub fn new(n: BigUint) -> Result<Self, PlaygroundError> {
        if n <= BigUint::one() || n.is_even() {
            return Err(PlaygroundError::InvalidModulus(n.to_str_radix(10)));
        }
        let n_squared = &n * &n;
        Ok(Self { n, n_squared })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    fn check_plaintext(&self, m: &BigUint) -> Result<(), PlaygroundError> {
        if m >= &self.n {
            return Err(PlaygroundError::PlaintextOutOfRange);
        }
        Ok(())
    }

    fn check_ciphertext(&self, c: &BigUint) -> Result<(), PlaygroundError> {
        if c >= &self.n_squared || !c.gcd(&self.n).is_one() {
            return Err(PlaygroundError::CiphertextOutOfRange);
        }
        Ok(())
    }

    /// `c = (1 + m·n) · rⁿ mod n²` with a fresh `r` coprime to `n`.
    pub fn encrypt(&self, m: &BigUint) -> Result<BigUint, PlaygroundError> {
        self.check_plaintext(m)?;
        let mut rng = OsRng;
        let r = loop {
            let candidate = rng.gen_biguint_range(&BigUint::one(), &self.n);
            if candidate.gcd(&self.n).is_one() {
                break candidate;
            }
        };
        let gm = (BigUint::one() + m * &self.n) % &self.n_squared;
        let rn = r.modpow(&self.n, &self.n_squared);
        Ok((gm * rn) % &self.n_squared)
    }

    /// `E(a) · E(b) mod n² = E(a + b mod n)`.
    pub fn add(&self, left: &BigUint, right: &BigUint) -> Result<BigUint, PlaygroundError> {
        self.check_ciphertext(left)?;
        self.check_ciphertext(right)?;
        Ok((left * right) % &self.n_squared)
    }

    /// `E(a) · gᵏ mod n² = E(a + k mod n)`.
    pub fn add_plaintext(&self, ciphertext: &BigUint, k: &BigUint) -> Result<BigUint, PlaygroundError> {
        self.check_ciphertext(ciphertext)?;
        self.check_plaintext(k)?;
        let gk = (BigUint::one() + k * &self.n) % &self.n_squared;
        Ok((ciphertext * gk) % &self.n_squared)
    }

    /// `E(a)ᵏ mod n² = E(a · k mod n)`.
    pub fn mul_scalar(&self, ciphertext: &BigUint, k: &BigUint) -> Result<BigUint, PlaygroundError> {
        self.check_ciphertext(ciphertext)?;
        Ok(ciphertext.modpow(k, &self.n_squared))
    }
}

impl AdditiveHomomorphic for PaillierPublicKey {
    type Plaintext = BigUint;
    type Ciphertext = BigUint;

    fn encrypt(&self, plaintext: &BigUint) -> Result<BigUint, PlaygroundError> {
        PaillierPublicKey::encrypt(self, plaintext)
    }

    fn add(&self, left: &BigUint, right: &BigUint) -> Result<BigUint, PlaygroundError> {
        PaillierPublicKey::add(self, left, right)
    }
}

impl PaillierPrivateKey {
    /// Rebuild a private key from its components.
    pub fn from_parts(n: BigUint, lambda: BigUint, mu: BigUint) -> Result<Self, PlaygroundError> {
        Ok(Self {
            lambda,
            mu,
            public: PaillierPublicKey::new(n)?,
        })
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public
    }

    /// `m = L(c^λ mod n²) · μ mod n` where `L(x) = (x - 1) / n`.
    pub fn decrypt(&self, ciphertext: &BigUint) -> Result<BigUint, PlaygroundError> {
        let public = &self.public;
        public.check_ciphertext(ciphertext)?;
        let u = ciphertext.modpow(&self.lambda, &public.n_squared);
        let l = (u - BigUint::one()) / &public.n;
        Ok((l * &self.mu) % &public.n)
    }

    pub fn view(&self) -> PaillierKeyView {
        PaillierKeyView {
            bits: self.public.bits(),
            n: self.public.n.to_str_radix(10),
            lambda: self.lambda.to_str_radix(10),
            mu: self.mu.to_str_radix(10),
        }
    }
}

/// Parse a decimal (or `0x`-prefixed hex) non-negative integer.
pub fn parse_biguint(field: &'static str, value: &str) -> Result<BigUint, PlaygroundError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(value.as_bytes(), 10),
    };
    parsed.ok_or_else(|| PlaygroundError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use std::sync::OnceLock;

    fn keys() -> &'static (PaillierPublicKey, PaillierPrivateKey) {
        static KEYS: OnceLock<(PaillierPublicKey, PaillierPrivateKey)> = OnceLock::new();
        KEYS.get_or_init(|| generate_keypair(256).expect("keygen"))
    }

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn modulus_has_requested_size() {
        let (public, private) = keys();
        assert_eq!(public.bits(), 256);
        assert_eq!(private.public_key(), public);
    }

    #[test]
    fn encrypts_and_decrypts() {
        let (public, private) = keys();
        let c = public.encrypt(&big(5)).unwrap();
        assert_eq!(private.decrypt(&c).unwrap(), big(5));
    }

    #[test]
    fn encryption_is_randomised() {
        let (public, _) = keys();
        assert_ne!(public.encrypt(&big(7)).unwrap(), public.encrypt(&big(7)).unwrap());
    }

    #[test]
    fn adds_under_encryption() {
        let (public, private) = keys();
        let c1 = public.encrypt(&big(5)).unwrap();
        let c2 = public.encrypt(&big(7)).unwrap();
        let sum = AdditiveHomomorphic::add(public, &c1, &c2).unwrap();
        assert_eq!(private.decrypt(&sum).unwrap(), big(12));
    }

    #[test]
    fn sum_wraps_modulo_n() {
        let (public, private) = keys();
        let near_n = public.n() - big(1);
        let c1 = public.encrypt(&near_n).unwrap();
        let c2 = public.encrypt(&big(3)).unwrap();
        let sum = public.add(&c1, &c2).unwrap();
        assert_eq!(private.decrypt(&sum).unwrap(), big(2));
    }

    #[test]
    fn plaintext_and_scalar_operations() {
        let (public, private) = keys();
        let c = public.encrypt(&big(10)).unwrap();
        let plus = public.add_plaintext(&c, &big(32)).unwrap();
        assert_eq!(private.decrypt(&plus).unwrap(), big(42));
        let times = public.mul_scalar(&c, &big(4)).unwrap();
        assert_eq!(private.decrypt(&times).unwrap(), big(40));
    }

    #[test]
    fn range_checks() {
        let (public, private) = keys();
        assert_eq!(
            public.encrypt(public.n()).unwrap_err(),
            PlaygroundError::PlaintextOutOfRange
        );
        assert_eq!(
            private.decrypt(public.n_squared()).unwrap_err(),
            PlaygroundError::CiphertextOutOfRange
        );
        assert_eq!(
            public.add(&BigUint::zero(), &big(1)).unwrap_err(),
            PlaygroundError::CiphertextOutOfRange
        );
    }

    #[test]
    fn rejects_tiny_or_odd_modulus() {
        assert_eq!(
            generate_keypair(64).unwrap_err(),
            PlaygroundError::InvalidModulusSize(64)
        );
        assert_eq!(
            generate_keypair(257).unwrap_err(),
            PlaygroundError::InvalidModulusSize(257)
        );
    }

    #[test]
    fn key_view_round_trips_through_parts() {
        let (public, private) = keys();
        let view = private.view();
        let rebuilt = PaillierPrivateKey::from_parts(
            parse_biguint("n", &view.n).unwrap(),
            parse_biguint("lambda", &view.lambda).unwrap(),
            parse_biguint("mu", &view.mu).unwrap(),
        )
        .unwrap();
        let c = public.encrypt(&big(99)).unwrap();
        assert_eq!(rebuilt.decrypt(&c).unwrap(), big(99));
    }

    #[test]
    fn rejects_degenerate_modulus() {
        for n in [0u64, 1, 4] {
            assert_eq!(
                PaillierPublicKey::new(big(n)).unwrap_err(),
                PlaygroundError::InvalidModulus(n.to_string())
            );
            assert!(PaillierPrivateKey::from_parts(big(n), big(1), big(1)).is_err());
        }

        // smallest accepted modulus still encrypts and decrypts without panicking
        let public = PaillierPublicKey::new(big(3)).unwrap();
        let c = public.encrypt(&big(0)).unwrap();
        let private = PaillierPrivateKey::from_parts(big(3), big(1), big(1)).unwrap();
        assert!(private.decrypt(&c).unwrap() < big(3));
    }

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_biguint("m", " 255 ").unwrap(), big(255));
        assert_eq!(parse_biguint("m", "0xff").unwrap(), big(255));
        assert!(parse_biguint("m", "-5").is_err());
    }
}
