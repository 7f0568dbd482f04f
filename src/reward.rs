//! Block reward distribution.
//!
//! All arithmetic is done in integer currency units. Each recipient takes
//! `floor(remaining * percent / 100)` of what is left, in configured order,
//! and the pool wallet receives whatever remains, so rounding dust always
//! accrues to the pool and the amounts sum to the block reward exactly.

use super::*;

/// A percentage with six fractional digits, stored as millionths of a percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharePercent(u64);

impl SharePercent {
    pub const SCALE: u64 = 1_000_000;
    pub const ZERO: Self = Self(0);
    pub const HUNDRED: Self = Self(100 * Self::SCALE);

    const FRACTION_DIGITS: usize = 6;

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_percent(percent: u64) -> Self {
        Self(percent * Self::SCALE)
    }

    pub fn micros(self) -> u64 {
        self.0
    }

    /// `floor(amount * self / 100)`.
    pub fn of(self, amount: u64) -> u64 {
        let share = u128::from(amount) * u128::from(self.0) / u128::from(Self::HUNDRED.0);
        // only called with shares of at most 100%
        share as u64
    }
}

impl FromStr for SharePercent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPercent { input: s.into() };

        let (whole, fraction) = s.trim().split_once('.').unwrap_or((s.trim(), ""));

        if (whole.is_empty() && fraction.is_empty())
            || fraction.len() > Self::FRACTION_DIGITS
            || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| invalid())?
        };

        let fraction = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = Self::FRACTION_DIGITS);
            padded.parse::<u64>().map_err(|_| invalid())?
        };

        whole
            .checked_mul(Self::SCALE)
            .and_then(|micros| micros.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Display for SharePercent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::SCALE;
        let fraction = self.0 % Self::SCALE;

        if fraction == 0 {
            write!(f, "{whole}")
        } else {
            let fraction = format!("{fraction:06}");
            write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
        }
    }
}

impl Serialize for SharePercent {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SharePercent {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = SharePercent;

            fn expecting(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str("a percentage as a number or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                v.checked_mul(SharePercent::SCALE)
                    .map(SharePercent)
                    .ok_or_else(|| E::custom(format!("percentage {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("negative percentage {v}")))
                    .and_then(|v| self.visit_u64(v))
            }

            // f64 Display is the shortest round-tripping decimal, never exponent notation
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                v.to_string().parse().map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        de.deserialize_any(Visitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRecipient {
    pub address: String,
    pub share_percent: SharePercent,
}

/// `ADDRESS:PERCENT`, as taken on the command line.
impl FromStr for RewardRecipient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((address, percent)) = s.rsplit_once(':') else {
            return Err(Error::InvalidRecipientShare {
                reason: format!("expected `ADDRESS:PERCENT`, got `{s}`"),
            });
        };

        Ok(Self {
            address: address.into(),
            share_percent: percent.parse()?,
        })
    }
}

/// Validated fee recipients plus the pool wallet that absorbs the remainder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    recipients: Vec<RewardRecipient>,
    pool_wallet: String,
}

impl RewardConfig {
    pub fn new(recipients: Vec<RewardRecipient>, pool_wallet: impl Into<String>) -> Result<Self> {
        let mut total = SharePercent::ZERO;

        for recipient in &recipients {
            let share = recipient.share_percent;

            if share == SharePercent::ZERO {
                return Err(Error::InvalidRecipientShare {
                    reason: format!("share for `{}` must be greater than 0%", recipient.address),
                });
            }

            if share > SharePercent::HUNDRED {
                return Err(Error::InvalidRecipientShare {
                    reason: format!(
                        "share for `{}` is {share}%, which exceeds 100%",
                        recipient.address
                    ),
                });
            }

            total = SharePercent(total.0.saturating_add(share.0));
        }

        if total >= SharePercent::HUNDRED {
            return Err(Error::InvalidRecipientShare {
                reason: format!(
                    "recipient shares sum to {total}%, leaving nothing for the pool wallet"
                ),
            });
        }

        Ok(Self {
            recipients,
            pool_wallet: pool_wallet.into(),
        })
    }

    pub fn recipients(&self) -> &[RewardRecipient] {
        &self.recipients
    }

    pub fn pool_wallet(&self) -> &str {
        &self.pool_wallet
    }

    pub fn distribute(&self, total: u64) -> Vec<(String, u64)> {
        split(
            self.recipients
                .iter()
                .map(|recipient| (recipient.address.clone(), recipient.share_percent)),
            self.pool_wallet.clone(),
            total,
        )
    }

    /// Decode every address up front so a bad address fails at load time rather than per job.
    pub fn resolve(&self, versions: AddressVersions) -> Result<ResolvedRewards> {
        let recipients = self
            .recipients
            .iter()
            .map(|recipient| {
                Ok((
                    Destination::from_address(&recipient.address, versions)?,
                    recipient.share_percent,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedRewards {
            recipients,
            pool_wallet: Destination::from_address(&self.pool_wallet, versions)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRewards {
    recipients: Vec<(Destination, SharePercent)>,
    pool_wallet: Destination,
}

impl ResolvedRewards {
    pub fn distribute(&self, total: u64) -> Vec<(Destination, u64)> {
        split(self.recipients.iter().copied(), self.pool_wallet, total)
    }
}

fn split<T>(
    recipients: impl Iterator<Item = (T, SharePercent)>,
    pool_wallet: T,
    total: u64,
) -> Vec<(T, u64)> {
    let mut remaining = total;

    let mut amounts = recipients
        .map(|(recipient, share)| {
            let amount = share.of(remaining);
            remaining -= amount;
            (recipient, amount)
        })
        .collect::<Vec<_>>();

    amounts.push((pool_wallet, remaining));

    amounts
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

    fn recipient(address: &str, percent: &str) -> RewardRecipient {
        RewardRecipient {
            address: address.into(),
            share_percent: percent.parse().unwrap(),
        }
    }

    #[test]
    fn parse_percent() {
        assert_eq!("1".parse::<SharePercent>().unwrap(), SharePercent::from_percent(1));
        assert_eq!(
            "0.5".parse::<SharePercent>().unwrap(),
            SharePercent::from_micros(500_000)
        );
        assert_eq!(
            "12.345678".parse::<SharePercent>().unwrap(),
            SharePercent::from_micros(12_345_678)
        );
        assert_eq!(
            ".25".parse::<SharePercent>().unwrap(),
            SharePercent::from_micros(250_000)
        );
        assert_eq!("100".parse::<SharePercent>().unwrap(), SharePercent::HUNDRED);
    }

    #[test]
    fn parse_percent_rejects_garbage() {
        for input in ["", ".", "-1", "1e-5", "abc", "1.2.3", "0.0000001", "1,5"] {
            assert_eq!(
                input.parse::<SharePercent>().unwrap_err(),
                Error::InvalidPercent {
                    input: input.into()
                },
                "{input}"
            );
        }
    }

    #[test]
    fn display_percent() {
        assert_eq!(SharePercent::from_percent(1).to_string(), "1");
        assert_eq!(SharePercent::from_micros(1_500_000).to_string(), "1.5");
        assert_eq!(SharePercent::from_micros(1).to_string(), "0.000001");
    }

    #[test]
    fn deserialize_percent_from_number_and_string() {
        let recipients = serde_json::from_str::<Vec<RewardRecipient>>(
            r#"[
              {"address": "a", "sharePercent": 1},
              {"address": "b", "sharePercent": 0.1},
              {"address": "c", "sharePercent": "2.25"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            recipients
                .iter()
                .map(|r| r.share_percent.micros())
                .collect::<Vec<_>>(),
            [1_000_000, 100_000, 2_250_000]
        );

        assert!(
            serde_json::from_str::<RewardRecipient>(r#"{"address":"a","sharePercent":-1}"#)
                .is_err()
        );
    }

    #[test]
    fn parse_recipient() {
        assert_eq!(
            "33FFrcn4Tv1qgGEuXPkkPdr44DuWp3RzPo:1.5"
                .parse::<RewardRecipient>()
                .unwrap(),
            recipient("33FFrcn4Tv1qgGEuXPkkPdr44DuWp3RzPo", "1.5")
        );

        assert!(matches!(
            "33FFrcn4Tv1qgGEuXPkkPdr44DuWp3RzPo".parse::<RewardRecipient>(),
            Err(Error::InvalidRecipientShare { .. })
        ));

        assert!(matches!(
            "33FFrcn4Tv1qgGEuXPkkPdr44DuWp3RzPo:lots".parse::<RewardRecipient>(),
            Err(Error::InvalidPercent { .. })
        ));
    }

    #[test]
    fn floor_then_remainder_to_pool() {
        let config = RewardConfig::new(vec![recipient("fee", "1")], POOL).unwrap();

        assert_eq!(
            config.distribute(5_000_000_000),
            [
                ("fee".to_string(), 50_000_000),
                (POOL.to_string(), 4_950_000_000)
            ]
        );

        assert_eq!(
            config.distribute(199),
            [("fee".to_string(), 1), (POOL.to_string(), 198)]
        );
    }

    #[test]
    fn shares_apply_to_remaining_in_order() {
        let config =
            RewardConfig::new(vec![recipient("a", "50"), recipient("b", "10")], POOL).unwrap();

        assert_eq!(
            config.distribute(1000),
            [
                ("a".to_string(), 500),
                ("b".to_string(), 50),
                (POOL.to_string(), 450)
            ]
        );
    }

    #[test]
    fn no_recipients_pays_pool_everything() {
        let config = RewardConfig::new(Vec::new(), POOL).unwrap();
        assert_eq!(config.distribute(42), [(POOL.to_string(), 42)]);
    }

    #[test]
    fn amounts_always_sum_to_total() {
        let share_sets: &[&[&str]] = &[
            &["1"],
            &["0.000001"],
            &["33.333333", "33.333333", "33.333333"],
            &["99.999999"],
            &["0.5", "1.5", "2.5", "3.5", "4.5"],
            &["12.345678", "7.654321"],
        ];

        let totals = [
            0,
            1,
            7,
            99,
            100,
            12_345,
            5_000_000_000,
            625_000_000 + 12_345_678,
            u64::MAX / 3,
            u64::MAX,
        ];

        for shares in share_sets {
            let recipients = shares
                .iter()
                .enumerate()
                .map(|(i, share)| recipient(&format!("r{i}"), share))
                .collect();

            let config = RewardConfig::new(recipients, POOL).unwrap();

            for total in totals {
                let amounts = config.distribute(total);
                assert_eq!(amounts.len(), shares.len() + 1);
                assert_eq!(
                    amounts.iter().map(|(_, amount)| u128::from(*amount)).sum::<u128>(),
                    u128::from(total),
                    "shares {shares:?} total {total}"
                );
            }
        }
    }

    #[test]
    fn rejects_zero_share() {
        let err = RewardConfig::new(vec![recipient("a", "0")], POOL).unwrap_err();
        assert!(matches!(err, Error::InvalidRecipientShare { .. }));
        assert!(err.to_string().contains("must be greater than 0%"));
    }

    #[test]
    fn rejects_share_above_hundred() {
        let err = RewardConfig::new(vec![recipient("a", "100.5")], POOL).unwrap_err();
        assert!(err.to_string().contains("exceeds 100%"), "{err}");
    }

    #[test]
    fn rejects_shares_summing_to_hundred() {
        let err =
            RewardConfig::new(vec![recipient("a", "60"), recipient("b", "40")], POOL).unwrap_err();

        assert_eq!(
            err,
            Error::InvalidRecipientShare {
                reason: "recipient shares sum to 100%, leaving nothing for the pool wallet".into()
            }
        );

        assert!(RewardConfig::new(vec![recipient("a", "100")], POOL).is_err());
    }

    #[test]
    fn resolve_decodes_addresses() {
        let config = RewardConfig::new(vec![recipient(POOL, "1")], POOL).unwrap();
        let resolved = config.resolve(AddressVersions::MAINNET).unwrap();

        let amounts = resolved.distribute(100);
        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0].1, 1);
        assert_eq!(amounts[1].1, 99);
        assert!(matches!(amounts[1].0, Destination::PubKeyHash(_)));
    }

    #[test]
    fn resolve_rejects_bad_address() {
        let config = RewardConfig::new(vec![recipient("nope", "1")], POOL).unwrap();
        assert!(matches!(
            config.resolve(AddressVersions::MAINNET),
            Err(Error::InvalidAddress { .. })
        ));
    }
}
