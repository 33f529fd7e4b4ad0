//! End-to-end compilation of representative transactions.

use std::collections::HashMap;
use std::sync::Arc;

use dotbit_address::display::eip55;
use dotbit_address::{ChainAddress, ChainType, LengthTable, LockArgsCodec};
use dotbit_message::witness::{
    AccountApproval, AccountCellFacts, ActionData, OfferCellFacts, SaleCellFacts,
    TransferApprovalParams, Versioned,
};
use dotbit_message::{
    CompileError, LookupError, MessageCompiler, StaticCellLookup, StaticTokenMap,
    StaticWitnessDecoder, WitnessFacts,
};
use dotbit_types::{
    Cell, CellInput, CellOutput, ContractName, HashType, NetType, OutPoint, Script,
    StaticContractRegistry, Transaction, H256,
};

const DAS_LOCK: H256 = H256([0xda; 32]);
const SECP: H256 = H256([0x9b; 32]);
const ACCOUNT: H256 = H256([0xac; 32]);
const SALE: H256 = H256([0x5a; 32]);
const OFFER: H256 = H256([0x0f; 32]);
const DP: H256 = H256([0xd9; 32]);
const REVERSE: H256 = H256([0x7e; 32]);

const CKB: u64 = 1_0000_0000;

fn registry() -> Arc<StaticContractRegistry> {
    Arc::new(
        StaticContractRegistry::new([
            (ContractName::DasLock, DAS_LOCK),
            (ContractName::Secp256k1Blake160, SECP),
            (ContractName::AccountCellType, ACCOUNT),
            (ContractName::AccountSaleCellType, SALE),
            (ContractName::OfferCellType, OFFER),
            (ContractName::DpCellType, DP),
            (ContractName::ReverseRecordCellType, REVERSE),
        ])
        .unwrap(),
    )
}

fn eth(byte: u8) -> ChainAddress {
    ChainAddress::new(ChainType::Eth, vec![byte; 20], &LengthTable::default()).unwrap()
}

fn das_lock(owner: u8) -> Script {
    let args = LockArgsCodec::default().encode(&eth(owner), &eth(owner)).unwrap();
    Script::new(DAS_LOCK, HashType::Type, args)
}

fn typed(hash: H256) -> Option<Script> {
    Some(Script::new(hash, HashType::Type, vec![]))
}

fn output(capacity: u64, lock: Script, type_: Option<Script>) -> CellOutput {
    CellOutput {
        capacity,
        lock,
        type_,
    }
}

fn account_data(expired_at: u64) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data[72..80].copy_from_slice(&expired_at.to_le_bytes());
    data
}

fn dp_data(units: u64) -> Vec<u8> {
    units.to_le_bytes().to_vec()
}

/// A transaction under construction plus the cells its inputs spend.
#[derive(Default)]
struct Fixture {
    tx: Transaction,
    lookup: StaticCellLookup,
    facts: WitnessFacts,
}

impl Fixture {
    fn action(action: &str) -> Self {
        Fixture {
            facts: WitnessFacts {
                action: Some(ActionData {
                    action: action.to_string(),
                    params: vec![0x01],
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn input(mut self, output: CellOutput, data: Vec<u8>) -> Self {
        let out_point = OutPoint {
            tx_hash: H256([0x77; 32]),
            index: self.tx.inputs.len() as u32,
        };
        self.lookup
            .insert(out_point.clone(), Cell { output, data });
        self.tx.inputs.push(CellInput {
            previous_output: out_point,
            since: 0,
        });
        self
    }

    fn output(mut self, output: CellOutput, data: Vec<u8>) -> Self {
        self.tx.outputs.push(output);
        self.tx.outputs_data.push(data);
        self
    }

    fn compiler(&self, net: NetType) -> MessageCompiler {
        MessageCompiler::new(
            net,
            registry(),
            Arc::new(self.lookup.clone()),
            Arc::new(StaticWitnessDecoder::new(self.facts.clone())),
        )
    }

    async fn compile(&self) -> Result<dotbit_message::TransactionSummary, CompileError> {
        self.compiler(NetType::Mainnet).compile(&self.tx, 0).await
    }
}

fn account_facts(index: usize, approval: Option<AccountApproval>) -> AccountCellFacts {
    AccountCellFacts {
        index,
        account: "alice.bit".to_string(),
        status: 0,
        records_hash: vec![0xaa; 32],
        approval,
    }
}

fn with_account_cell(fixture: Fixture) -> Fixture {
    let mut fixture = fixture
        .input(output(200 * CKB, das_lock(1), typed(ACCOUNT)), account_data(1_800_000_000))
        .output(output(200 * CKB, das_lock(2), typed(ACCOUNT)), account_data(1_800_000_000));
    fixture.facts.account_cell = Versioned {
        old: Some(account_facts(0, None)),
        new: Some(account_facts(0, None)),
    };
    fixture
}

// ──────────────────────────────────────────────
// Capacity summary
// ──────────────────────────────────────────────

#[tokio::test]
async fn transfer_fee_and_grouping() {
    let fixture = Fixture::action("transfer")
        .input(output(100 * CKB, das_lock(1), None), vec![])
        .input(output(50 * CKB, das_lock(2), None), vec![])
        .output(output(140 * CKB, das_lock(3), None), vec![]);
    let summary = fixture.compile().await.unwrap();

    assert_eq!(summary.inputs_capacity, "150 CKB");
    assert_eq!(summary.outputs_capacity, "140 CKB");
    assert_eq!(summary.fee, "10 CKB");
    assert_eq!(
        summary.message,
        format!(
            "TRANSFER FROM {}(100 CKB), {}(50 CKB) TO {}(140 CKB)",
            eip55(&[1; 20]),
            eip55(&[2; 20]),
            eip55(&[3; 20])
        )
    );
    // untyped cells count toward totals but are not listed
    assert!(summary.inputs.is_empty());
    assert!(summary.outputs.is_empty());
    assert_eq!(summary.chain_id, 1);
    assert_eq!(summary.action.action, "transfer");
    assert_eq!(summary.action.params, "0x01");
}

#[tokio::test]
async fn transfer_merges_repeated_owner() {
    let fixture = Fixture::action("transfer")
        .input(output(100 * CKB, das_lock(1), None), vec![])
        .input(output(50 * CKB, das_lock(1), None), vec![])
        .output(output(140 * CKB, das_lock(2), None), vec![]);
    assert_eq!(
        fixture.compile().await.unwrap().message,
        format!(
            "TRANSFER FROM {}(150 CKB) TO {}(140 CKB)",
            eip55(&[1; 20]),
            eip55(&[2; 20])
        )
    );
}

#[tokio::test]
async fn withdraw_groups_native_locks_by_full_address() {
    let secp = Script::new(SECP, HashType::Type, vec![0x33; 20]);
    let fixture = Fixture::action("withdraw_from_wallet")
        .input(output(80 * CKB, das_lock(1), None), vec![])
        .output(output(30 * CKB, secp.clone(), None), vec![])
        .output(output(49 * CKB, das_lock(1), None), vec![])
        .output(output(CKB, secp, None), vec![]);
    let summary = fixture.compile().await.unwrap();
    let (from, to) = summary
        .message
        .strip_prefix("TRANSFER FROM ")
        .and_then(|m| m.split_once(" TO "))
        .unwrap();
    assert_eq!(from, format!("{}(80 CKB)", eip55(&[1; 20])));
    let parts: Vec<&str> = to.split(", ").collect();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].starts_with("ckb1") && parts[0].ends_with("(31 CKB)"));
    assert_eq!(parts[1], format!("{}(49 CKB)", eip55(&[1; 20])));
    assert_eq!(summary.fee, "0 CKB");
}

#[tokio::test]
async fn negative_fee_is_rejected() {
    let fixture = Fixture::action("transfer")
        .input(output(10 * CKB, das_lock(1), None), vec![])
        .output(output(11 * CKB, das_lock(2), None), vec![]);
    assert!(matches!(
        fixture.compile().await,
        Err(CompileError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn unresolved_input_aborts() {
    let mut fixture = Fixture::action("transfer")
        .input(output(10 * CKB, das_lock(1), None), vec![])
        .output(output(9 * CKB, das_lock(2), None), vec![]);
    fixture.tx.inputs.push(CellInput {
        previous_output: OutPoint {
            tx_hash: H256([0x01; 32]),
            index: 5,
        },
        since: 0,
    });
    match fixture.compile().await {
        Err(CompileError::UnresolvedInput {
            index, out_index, source, ..
        }) => {
            assert_eq!(index, 1);
            assert_eq!(out_index, 5);
            assert_eq!(source, LookupError::NotFound);
        }
        other => panic!("expected UnresolvedInput, got {:?}", other),
    }
}

#[tokio::test]
async fn chain_id_defaults_follow_network() {
    let fixture = Fixture::action("transfer")
        .input(output(10 * CKB, das_lock(1), None), vec![])
        .output(output(9 * CKB, das_lock(2), None), vec![]);
    let testnet = fixture.compiler(NetType::Testnet2);
    assert_eq!(testnet.compile(&fixture.tx, 0).await.unwrap().chain_id, 17000);
    assert_eq!(testnet.compile(&fixture.tx, 56).await.unwrap().chain_id, 56);
}

#[tokio::test]
async fn unknown_action_is_unsupported() {
    let fixture = Fixture::action("renew_account")
        .input(output(10 * CKB, das_lock(1), None), vec![]);
    assert_eq!(
        fixture.compile().await.unwrap_err(),
        CompileError::UnsupportedAction("renew_account".to_string())
    );
}

// ──────────────────────────────────────────────
// Account actions
// ──────────────────────────────────────────────

#[tokio::test]
async fn account_cell_line_items_and_edit_records() {
    let summary = with_account_cell(Fixture::action("edit_records"))
        .compile()
        .await
        .unwrap();
    assert_eq!(summary.message, "EDIT RECORDS OF ACCOUNT alice.bit");
    assert_eq!(summary.inputs.len(), 1);
    assert_eq!(
        summary.inputs[0].data,
        "{ account: alice.bit, expired_at: 1800000000 }"
    );
    assert_eq!(
        summary.outputs[0].extra_data,
        format!("{{ status: 0, records_hash: 0x{} }}", "aa".repeat(32))
    );
}

#[tokio::test]
async fn transfer_account_names_new_owner() {
    let summary = with_account_cell(Fixture::action("transfer_account"))
        .compile()
        .await
        .unwrap();
    assert_eq!(
        summary.message,
        format!("TRANSFER THE ACCOUNT alice.bit TO {}", eip55(&[2; 20]))
    );
}

#[tokio::test]
async fn sale_actions_use_sale_price() {
    let mut fixture = with_account_cell(Fixture::action("start_account_sale"))
        .input(output(101 * CKB, das_lock(1), None), vec![])
        .output(output(100 * CKB, das_lock(1), typed(SALE)), vec![]);
    fixture.facts.account_sale_cell = Versioned {
        old: None,
        new: Some(SaleCellFacts {
            account: "alice.bit".to_string(),
            price: 1234_5000_0000,
        }),
    };
    let summary = fixture.compile().await.unwrap();
    assert_eq!(summary.message, "SELL alice.bit FOR 1234.5 CKB");
}

#[tokio::test]
async fn edit_manager_and_cross_chain_lock_name_the_account() {
    let edit = with_account_cell(Fixture::action("edit_manager"));
    assert_eq!(
        edit.compile().await.unwrap().message,
        "EDIT MANAGER OF ACCOUNT alice.bit"
    );

    let lock = with_account_cell(Fixture::action("lock_account_for_cross_chain"));
    assert_eq!(
        lock.compile().await.unwrap().message,
        "LOCK alice.bit FOR CROSS CHAIN"
    );
}

fn sale(price: u64) -> SaleCellFacts {
    SaleCellFacts {
        account: "alice.bit".to_string(),
        price,
    }
}

#[tokio::test]
async fn edit_account_sale_reports_new_price() {
    let mut fixture = Fixture::action("edit_account_sale")
        .input(output(100 * CKB, das_lock(1), typed(SALE)), vec![])
        .output(output(100 * CKB, das_lock(1), typed(SALE)), vec![]);
    fixture.facts.account_sale_cell = Versioned {
        old: Some(sale(10 * CKB)),
        new: Some(sale(25 * CKB)),
    };
    assert_eq!(
        fixture.compile().await.unwrap().message,
        "EDIT SALE INFO, CURRENT PRICE IS 25 CKB"
    );
}

#[tokio::test]
async fn cancel_account_sale_names_the_account() {
    let mut fixture = with_account_cell(Fixture::action("cancel_account_sale"))
        .input(output(100 * CKB, das_lock(1), typed(SALE)), vec![])
        .output(output(100 * CKB, das_lock(1), None), vec![]);
    fixture.facts.account_sale_cell.old = Some(sale(10 * CKB));
    assert_eq!(
        fixture.compile().await.unwrap().message,
        "CANCEL SALE OF alice.bit"
    );
}

#[tokio::test]
async fn buy_account_uses_spent_sale_price() {
    let mut fixture = with_account_cell(Fixture::action("buy_account"))
        .input(output(100 * CKB, das_lock(1), typed(SALE)), vec![])
        .input(output(1300 * CKB, das_lock(2), None), vec![])
        .output(output(1334 * CKB, das_lock(1), None), vec![]);
    fixture.facts.account_sale_cell.old = Some(sale(1234_5000_0000));
    let summary = fixture.compile().await.unwrap();
    assert_eq!(summary.message, "BUY alice.bit WITH 1234.5 CKB");
    assert_eq!(summary.fee, "66 CKB");
}

#[tokio::test]
async fn make_and_edit_offer() {
    let offer = |price| OfferCellFacts {
        account: "bob.bit".to_string(),
        price,
    };
    let mut make = Fixture::action("make_offer")
        .input(output(300 * CKB, das_lock(1), None), vec![])
        .output(output(200 * CKB, das_lock(1), typed(OFFER)), vec![]);
    make.facts.offer_cell.new = Some(offer(200 * CKB));
    assert_eq!(
        make.compile().await.unwrap().message,
        "MAKE AN OFFER ON bob.bit WITH 200 CKB"
    );

    let mut edit = Fixture::action("edit_offer")
        .input(output(200 * CKB, das_lock(1), typed(OFFER)), vec![])
        .output(output(150 * CKB, das_lock(1), typed(OFFER)), vec![]);
    edit.facts.offer_cell = Versioned {
        old: Some(offer(200 * CKB)),
        new: Some(offer(150 * CKB)),
    };
    assert_eq!(
        edit.compile().await.unwrap().message,
        "CHANGE THE OFFER ON bob.bit FROM 200 CKB TO 150 CKB"
    );
}

#[tokio::test]
async fn cancel_offer_counts_offer_cells() {
    let fixture = Fixture::action("cancel_offer")
        .input(output(100 * CKB, das_lock(1), typed(OFFER)), vec![])
        .input(output(100 * CKB, das_lock(1), typed(OFFER)), vec![])
        .input(output(100 * CKB, das_lock(1), typed(OFFER)), vec![])
        .output(output(299 * CKB, das_lock(1), None), vec![]);
    let summary = fixture.compile().await.unwrap();
    assert_eq!(summary.message, "CANCEL 3 OFFER(S)");
    assert_eq!(summary.inputs.len(), 3);
}

#[tokio::test]
async fn accept_offer_reads_spent_offer() {
    let mut fixture = with_account_cell(Fixture::action("accept_offer"))
        .input(output(200 * CKB, das_lock(3), typed(OFFER)), vec![])
        .output(output(199 * CKB, das_lock(1), None), vec![]);
    fixture.facts.offer_cell.old = Some(OfferCellFacts {
        account: "alice.bit".to_string(),
        price: 200 * CKB,
    });
    assert_eq!(
        fixture.compile().await.unwrap().message,
        "ACCEPT THE OFFER ON alice.bit WITH 200 CKB"
    );
}

// ──────────────────────────────────────────────
// Reverse records
// ──────────────────────────────────────────────

fn reverse_cell(owner: u8) -> CellOutput {
    output(200 * CKB, das_lock(owner), typed(REVERSE))
}

#[tokio::test]
async fn declare_reverse_record() {
    let fixture = Fixture::action("declare_reverse_record")
        .input(output(300 * CKB, das_lock(1), None), vec![])
        .output(reverse_cell(1), b"alice.bit".to_vec())
        .output(output(99 * CKB, das_lock(1), None), vec![]);
    assert_eq!(
        fixture.compile().await.unwrap().message,
        format!(
            "DECLARE A REVERSE RECORD FROM {} TO alice.bit",
            eip55(&[1; 20])
        )
    );
}

#[tokio::test]
async fn redeclare_reverse_record_names_new_account() {
    let fixture = Fixture::action("redeclare_reverse_record")
        .input(reverse_cell(1), b"old.bit".to_vec())
        .output(reverse_cell(1), b"new.bit".to_vec());
    let summary = fixture.compile().await.unwrap();
    assert_eq!(
        summary.message,
        format!(
            "REDECLARE A REVERSE RECORD FROM {} TO new.bit",
            eip55(&[1; 20])
        )
    );
    assert_eq!(summary.inputs.len(), 1);
    assert_eq!(summary.outputs.len(), 1);
}

#[tokio::test]
async fn retract_reverse_records_of_several_accounts() {
    let fixture = Fixture::action("retract_reverse_record")
        .input(reverse_cell(1), b"a.bit".to_vec())
        .input(reverse_cell(1), b"b.bit".to_vec())
        .output(output(399 * CKB, das_lock(1), None), vec![]);
    assert_eq!(
        fixture.compile().await.unwrap().message,
        format!("RETRACT REVERSE RECORDS ON {}", eip55(&[1; 20]))
    );
}

#[tokio::test]
async fn two_accounts_on_one_side_stay_ambiguous() {
    let fixture = Fixture::action("declare_reverse_record")
        .input(output(500 * CKB, das_lock(1), None), vec![])
        .output(reverse_cell(1), b"a.bit".to_vec())
        .output(reverse_cell(1), b"b.bit".to_vec());
    assert!(matches!(
        fixture.compile().await,
        Err(CompileError::ClassificationAmbiguous { .. })
    ));
}

#[tokio::test]
async fn approvals_render_recipient_and_deadline() {
    let approval = AccountApproval::Transfer(TransferApprovalParams {
        platform_lock: None,
        protected_until: 0,
        sealed_until: 1_700_000_000,
        delay_count_remain: 1,
        to_lock: das_lock(9),
    });

    let mut create = with_account_cell(Fixture::action("create_approval"));
    create.facts.account_cell.new = Some(account_facts(0, Some(approval.clone())));
    assert_eq!(
        create.compile().await.unwrap().message,
        format!(
            "APPROVE TRANSFER alice.bit TO {} AFTER 1700000000",
            eip55(&[9; 20])
        )
    );

    let mut fulfill = with_account_cell(Fixture::action("fulfill_approval"));
    fulfill.facts.account_cell.old = Some(account_facts(0, Some(approval.clone())));
    assert_eq!(
        fulfill.compile().await.unwrap().message,
        format!(
            "FULFILL THE TRANSFER APPROVAL OF alice.bit, TRANSFER TO {}",
            eip55(&[9; 20])
        )
    );

    let mut delay = with_account_cell(Fixture::action("delay_approval"));
    delay.facts.account_cell.new = Some(account_facts(0, Some(approval.clone())));
    assert_eq!(
        delay.compile().await.unwrap().message,
        "DELAY THE TRANSFER APPROVAL OF alice.bit TO 1700000000"
    );

    let mut revoke = with_account_cell(Fixture::action("revoke_approval"));
    revoke.facts.account_cell.old = Some(account_facts(0, Some(approval)));
    assert_eq!(
        revoke.compile().await.unwrap().message,
        "REVOKE THE TRANSFER APPROVAL OF alice.bit"
    );

    let unapproved = with_account_cell(Fixture::action("revoke_approval"));
    assert!(matches!(
        unapproved.compile().await,
        Err(CompileError::MissingFact { .. })
    ));
}

// ──────────────────────────────────────────────
// DP actions
// ──────────────────────────────────────────────

fn dp_cell(owner: u8) -> CellOutput {
    output(150 * CKB, das_lock(owner), typed(DP))
}

#[tokio::test]
async fn burn_subtracts_change_returned_to_owner() {
    let fixture = Fixture::action("burn_dp")
        .input(dp_cell(1), dp_data(500_000))
        .output(dp_cell(1), dp_data(200_000));
    let summary = fixture.compile().await.unwrap();
    assert_eq!(
        summary.message,
        format!("BURN 0.3 DP FROM {}", eip55(&[1; 20]))
    );
}

#[tokio::test]
async fn burn_from_two_owners_is_ambiguous() {
    let fixture = Fixture::action("burn_dp")
        .input(dp_cell(1), dp_data(500_000))
        .input(dp_cell(2), dp_data(500_000))
        .output(output(299 * CKB, das_lock(1), None), vec![]);
    assert!(matches!(
        fixture.compile().await,
        Err(CompileError::ClassificationAmbiguous { .. })
    ));
}

#[tokio::test]
async fn transfer_dp_groups_recipients() {
    let fixture = Fixture::action("transfer_dp")
        .input(output(1000 * CKB, das_lock(1), None), vec![])
        .input(dp_cell(1), dp_data(3_000_000))
        .output(dp_cell(2), dp_data(1_000_000))
        .output(dp_cell(3), dp_data(250_000))
        .output(dp_cell(2), dp_data(500_000))
        .output(dp_cell(1), dp_data(1_250_000));
    let summary = fixture.compile().await.unwrap();
    assert_eq!(
        summary.message,
        format!(
            "TRANSFER FROM {a}(3 DP) TO {b}(1.5 DP), {c}(0.25 DP), {a}(1.25 DP)",
            a = eip55(&[1; 20]),
            b = eip55(&[2; 20]),
            c = eip55(&[3; 20])
        )
    );
}

#[tokio::test]
async fn bid_uses_supplied_token_map() {
    let fixture = with_account_cell(Fixture::action("bid_expired_account_auction"))
        .input(dp_cell(1), dp_data(10_000_000))
        .output(dp_cell(1), dp_data(1));

    let derived = fixture.compile().await.unwrap();
    assert_eq!(
        derived.message,
        "BID EXPIRED ACCOUNT alice.bit WITH 9.999999 DP"
    );

    let supplied = StaticTokenMap::new(HashMap::from([("01".repeat(20), 2_500_000)]));
    let summary = fixture
        .compiler(NetType::Mainnet)
        .with_token_map(Arc::new(supplied))
        .compile(&fixture.tx, 0)
        .await
        .unwrap();
    assert_eq!(summary.message, "BID EXPIRED ACCOUNT alice.bit WITH 7.5 DP");
}
