//! Property-based tests: random operation sequences never break the
//! registry invariants, and rejected operations never mutate state.

use std::collections::HashSet;

use customrpc::{AddOutcome, ChainId, CustomRpcRegistry, RemoveEffect, RpcEndpoint};
use proptest::prelude::*;

const CHAINS: [ChainId; 3] = [ChainId::MAINNET, ChainId::OPTIMISM, ChainId::POLYGON];

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize, u8),
    Update(usize, usize, u8),
    SetActive(usize, usize),
    Remove(usize),
}

fn url(i: usize) -> String {
    format!("http://node{i}.rpc")
}

fn endpoint(chain: usize, url_index: usize, label: u8) -> RpcEndpoint {
    RpcEndpoint::new(CHAINS[chain], url(url_index)).with_display_name(format!("label-{label}"))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let chain = 0..CHAINS.len();
    let url_index = 0usize..6;
    prop_oneof![
        3 => (chain.clone(), url_index.clone(), 0u8..4).prop_map(|(c, u, l)| Op::Add(c, u, l)),
        1 => (chain.clone(), url_index.clone(), 0u8..4).prop_map(|(c, u, l)| Op::Update(c, u, l)),
        1 => (chain, url_index.clone()).prop_map(|(c, u)| Op::SetActive(c, u)),
        2 => url_index.prop_map(Op::Remove),
    ]
}

fn check_invariants(registry: &CustomRpcRegistry) -> Result<(), TestCaseError> {
    let mut all_urls = HashSet::new();
    for (chain_id, group) in registry.chains() {
        prop_assert!(!group.is_empty(), "chain {} kept an empty group", chain_id);
        prop_assert!(
            group.contains(group.active_rpc_url()),
            "chain {} active pointer '{}' dangles",
            chain_id,
            group.active_rpc_url()
        );
        for endpoint in group.endpoints() {
            prop_assert_eq!(endpoint.chain_id, *chain_id);
            prop_assert!(
                all_urls.insert(endpoint.rpc_url.clone()),
                "url '{}' registered twice",
                endpoint.rpc_url
            );
        }
    }
    prop_assert_eq!(registry.list_chains().len(), registry.len());
    Ok(())
}

fn apply(registry: &mut CustomRpcRegistry, op: &Op) -> Result<(), TestCaseError> {
    let before = registry.clone();
    match *op {
        Op::Add(c, u, l) => {
            let existed = before.chain_group(CHAINS[c]).is_some();
            match registry.add_custom_rpc(endpoint(c, u, l)) {
                Ok(AddOutcome::Created) => {
                    prop_assert!(!existed);
                    prop_assert_eq!(
                        registry.chain_group(CHAINS[c]).map(|g| g.active_rpc_url().to_owned()),
                        Some(url(u))
                    );
                }
                Ok(_) => {
                    let before_active = before.chain_group(CHAINS[c]).map(|g| g.active_rpc_url());
                    let after_active = registry.chain_group(CHAINS[c]).map(|g| g.active_rpc_url());
                    prop_assert_eq!(before_active, after_active);
                }
                Err(_) => prop_assert_eq!(&*registry, &before),
            }
        }
        Op::Update(c, u, l) => match registry.update_custom_rpc(endpoint(c, u, l)) {
            Ok(()) => {
                let before_active = before.chain_group(CHAINS[c]).map(|g| g.active_rpc_url());
                let after_active = registry.chain_group(CHAINS[c]).map(|g| g.active_rpc_url());
                prop_assert_eq!(before_active, after_active);
                let group = registry.chain_group(CHAINS[c]).unwrap();
                prop_assert_eq!(group.len(), before.chain_group(CHAINS[c]).unwrap().len());
                let expected_label = format!("label-{l}");
                prop_assert_eq!(
                    group.get(&url(u)).map(|e| e.display_name.as_str()),
                    Some(expected_label.as_str())
                );
            }
            Err(_) => prop_assert_eq!(&*registry, &before),
        },
        Op::SetActive(c, u) => match registry.set_active_rpc(CHAINS[c], &url(u)) {
            Ok(()) => prop_assert_eq!(
                registry.chain_group(CHAINS[c]).map(|g| g.active_rpc_url().to_owned()),
                Some(url(u))
            ),
            Err(_) => prop_assert_eq!(&*registry, &before),
        },
        Op::Remove(u) => match registry.remove_custom_rpc(&url(u)) {
            Ok(removal) => {
                let old = before.chain_group(removal.chain_id).unwrap();
                let survivors: Vec<_> = old
                    .endpoints()
                    .iter()
                    .filter(|e| e.rpc_url != url(u))
                    .cloned()
                    .collect();
                match removal.effect {
                    RemoveEffect::ChainRemoved => {
                        prop_assert!(survivors.is_empty());
                        prop_assert!(registry.chain_group(removal.chain_id).is_none());
                    }
                    RemoveEffect::Promoted(next) => {
                        prop_assert_eq!(old.active_rpc_url(), url(u));
                        prop_assert_eq!(&next, &survivors[0].rpc_url);
                    }
                    RemoveEffect::Removed => {
                        let group = registry.chain_group(removal.chain_id).unwrap();
                        prop_assert_eq!(group.active_rpc_url(), old.active_rpc_url());
                    }
                }
                if let Some(group) = registry.chain_group(removal.chain_id) {
                    prop_assert_eq!(group.endpoints(), survivors.as_slice());
                }
            }
            Err(_) => prop_assert_eq!(&*registry, &before),
        },
    }
    Ok(())
}

proptest! {
    /// Every prefix of a random operation sequence satisfies the invariants.
    #[test]
    fn invariants_hold_after_every_operation(
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut registry = CustomRpcRegistry::new();
        for op in &ops {
            apply(&mut registry, op)?;
            check_invariants(&registry)?;
        }
    }

    /// The registry survives a snapshot round trip unchanged.
    #[test]
    fn snapshot_restores_identical_registry(
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut registry = CustomRpcRegistry::new();
        for op in &ops {
            apply(&mut registry, op)?;
        }
        let json = serde_json::to_string(&customrpc::store::Snapshot::from_registry(&registry)).unwrap();
        let snapshot: customrpc::store::Snapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(snapshot.into_registry().unwrap(), registry);
    }
}
