//! Storage patches applied to the simulated chains at startup.
//!
//! Keys and values use the JSON shape chopsticks' `import-storage` expects:
//! pallet -> item -> list of `[key tuple, value]`. Balances are written as
//! decimal strings since most of them do not fit a JSON number.

use serde_json::{Map, Value, json};
use xcm::v4::{Junction, Location, NetworkId};

use crate::constants::{ETH_MIN_BALANCE, USDC_ASSET_INDEX, USDT_ASSET_INDEX, initial_balances};
use crate::error::{Error, Result};
use crate::location::asset_location;
use crate::types::{Account, Asset, AssetSourceRelation, Chain};

fn balance(amount: u128) -> Value {
    Value::String(amount.to_string())
}

fn number(n: u128) -> Value {
    u64::try_from(n).map(Value::from).unwrap_or_else(|_| balance(n))
}

fn system_account(account: Account, free: u128) -> Value {
    json!([[account.address()], { "providers": 1, "data": { "free": balance(free) } }])
}

fn junction_json(junction: &Junction) -> Result<Value> {
    Ok(match junction {
        Junction::Parachain(id) => json!({ "parachain": id }),
        Junction::PalletInstance(index) => json!({ "palletInstance": index }),
        Junction::GeneralIndex(index) => json!({ "generalIndex": number(*index) }),
        Junction::GlobalConsensus(NetworkId::Ethereum { chain_id }) => {
            json!({ "globalConsensus": { "ethereum": { "chainId": chain_id } } })
        }
        Junction::AccountKey20 { network: None, key } => {
            json!({ "accountKey20": { "network": null, "key": format!("0x{}", hex::encode(key)) } })
        }
        Junction::AccountId32 { network: None, id } => {
            json!({ "accountId32": { "network": null, "id": format!("0x{}", hex::encode(id)) } })
        }
        other => return Err(Error::Config(format!("no storage encoding for {other:?}"))),
    })
}

/// JSON form of `location` as accepted in storage keys.
pub fn location_json(location: &Location) -> Result<Value> {
    let junctions = location
        .interior()
        .iter()
        .map(junction_json)
        .collect::<Result<Vec<_>>>()?;
    let mut interior = Map::new();
    if junctions.is_empty() {
        interior.insert("here".into(), Value::Null);
    } else {
        interior.insert(format!("x{}", junctions.len()), Value::Array(junctions));
    }
    Ok(json!({ "parents": location.parent_count(), "interior": interior }))
}

/// Foreign assets held by Bob, plus ETH registered as a foreign asset.
pub fn polimec_storage() -> Result<Value> {
    let foreign = |asset: Asset| {
        let relation = match asset {
            Asset::Dot => AssetSourceRelation::Parent,
            _ => AssetSourceRelation::Sibling,
        };
        asset_location(asset, relation).and_then(|l| location_json(&l))
    };
    let eth = location_json(&asset_location(Asset::Eth, AssetSourceRelation::Here)?)?;
    let alice = Account::Alice.address();

    Ok(json!({
        "System": {
            "Account": [system_account(Account::Bob, initial_balances::PLMC)],
        },
        "ForeignAssets": {
            "Account": [
                [
                    [foreign(Asset::Usdc)?, Account::Bob.address()],
                    { "balance": balance(initial_balances::USDC) }
                ],
                [
                    [foreign(Asset::Usdt)?, Account::Bob.address()],
                    { "balance": balance(initial_balances::USDT) }
                ],
                [
                    [foreign(Asset::Dot)?, Account::Bob.address()],
                    { "balance": balance(initial_balances::DOT) }
                ],
            ],
            "Asset": [
                [[eth.clone()], {
                    "owner": alice,
                    "issuer": alice,
                    "admin": alice,
                    "freezer": alice,
                    "supply": balance(100 * initial_balances::ETH),
                    "deposit": 0,
                    "min_balance": balance(ETH_MIN_BALANCE),
                    "is_sufficient": true,
                    "accounts": 1,
                    "sufficients": 1,
                    "approvals": 0,
                    "status": "Live",
                }],
            ],
            "Metadata": [
                [[eth], { "symbol": "Ether", "name": "ETH", "decimals": 18, "isFrozen": false }],
            ],
        },
    }))
}

pub fn polkadot_hub_storage() -> Value {
    let asset_account = |index: u128, account: Account, amount: u128| {
        json!([[number(index), account.address()], { "balance": balance(amount) }])
    };
    json!({
        "System": {
            "Account": [
                system_account(Account::Alice, initial_balances::DOT),
                system_account(Account::Bob, initial_balances::DOT),
            ],
        },
        "Assets": {
            "Account": [
                asset_account(USDT_ASSET_INDEX, Account::Alice, initial_balances::USDT),
                asset_account(USDC_ASSET_INDEX, Account::Alice, initial_balances::USDC),
                asset_account(USDT_ASSET_INDEX, Account::Bob, initial_balances::USDC),
                asset_account(USDC_ASSET_INDEX, Account::Bob, initial_balances::USDC),
            ],
        },
    })
}

pub fn polkadot_storage() -> Value {
    json!({
        "System": {
            "Account": [system_account(Account::Alice, initial_balances::RELAY_DOT)],
        },
        "ParasDisputes": {
            "$removePrefix": ["disputes"],
        },
    })
}

pub fn bridge_hub_storage() -> Value {
    json!({
        "System": {
            "Account": [system_account(Account::Alice, initial_balances::DOT)],
        },
    })
}

/// Default patch for `chain`. Polimec's is opt-in, see `ChainSetup::initialize`.
pub fn default_storage(chain: Chain) -> Option<Value> {
    match chain {
        Chain::Polimec => None,
        Chain::PolkadotHub => Some(polkadot_hub_storage()),
        Chain::Polkadot => Some(polkadot_storage()),
        Chain::BridgeHub => Some(bridge_hub_storage()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdt_location_shape() {
        let usdt = asset_location(Asset::Usdt, AssetSourceRelation::Sibling).unwrap();
        assert_eq!(
            location_json(&usdt).unwrap(),
            json!({
                "parents": 1,
                "interior": {
                    "x3": [
                        { "parachain": 1000 },
                        { "palletInstance": 50 },
                        { "generalIndex": 1984 },
                    ]
                },
            })
        );
    }

    #[test]
    fn here_and_bridged_shapes() {
        let dot = asset_location(Asset::Dot, AssetSourceRelation::Parent).unwrap();
        assert_eq!(
            location_json(&dot).unwrap(),
            json!({ "parents": 1, "interior": { "here": null } })
        );
        let weth = asset_location(Asset::Weth, AssetSourceRelation::Here).unwrap();
        let weth = location_json(&weth).unwrap();
        assert_eq!(
            weth["interior"]["x2"][0],
            json!({ "globalConsensus": { "ethereum": { "chainId": 1 } } })
        );
        assert_eq!(
            weth["interior"]["x2"][1]["accountKey20"]["key"],
            json!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")
        );
    }

    #[test]
    fn large_balances_are_strings() {
        let polimec = polimec_storage().unwrap();
        assert_eq!(
            polimec["System"]["Account"][0][1]["data"]["free"],
            json!("10000000000000000000")
        );
        assert_eq!(polimec["ForeignAssets"]["Account"].as_array().map(Vec::len), Some(3));
        assert_eq!(
            polkadot_storage()["ParasDisputes"],
            json!({ "$removePrefix": ["disputes"] })
        );
    }

    #[test]
    fn only_polimec_is_opt_in() {
        assert!(default_storage(Chain::Polimec).is_none());
        for chain in [Chain::PolkadotHub, Chain::Polkadot, Chain::BridgeHub] {
            assert!(default_storage(chain).is_some());
        }
    }
}
