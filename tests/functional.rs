//! Runs against a LocalSecret node (`secretdev-1`, gRPC on localhost:9090).
//! Start one, build `artifacts/snipix.wasm`, then `cargo test -- --ignored`.

use std::time::Duration;

use anyhow::Context;
use secret_client_rs::{
    chain::{ChainConfig, Network, DENOM},
    snip20::{InitMsg, InitialBalance, Logo, MarketingInfo},
    ClientBuilder, SecretClient, Wallet,
};

// Test accounts from https://docs.scrt.network/dev/LocalSecret.html#accounts
const TEST_ACCOUNT_A_MNEMONIC: &str = "grant rice replace explain federal release fix clever romance raise often wild taxi quarter soccer fiber love must tape steak together observe swap guitar";
const TEST_ACCOUNT_B_MNEMONIC: &str = "jelly shadow frog dirt dragon use armed praise universe win jungle close inmate rain oil canvas beauty pioneer chef soccer icon dizzy thunder meadow";
const TEST_ACCOUNT_C_MNEMONIC: &str = "chair love bleak wonder skirt permit say assist aunt credit roast size obtain minute throw sand usual age smart exact enough room shadow charge";

struct Wallets {
    alice: Wallet,
    bob: Wallet,
    #[allow(dead_code)]
    charlie: Wallet,
}

fn wallets() -> anyhow::Result<Wallets> {
    Ok(Wallets {
        alice: Wallet::from_mnemonic(TEST_ACCOUNT_A_MNEMONIC)?,
        bob: Wallet::from_mnemonic(TEST_ACCOUNT_B_MNEMONIC)?,
        charlie: Wallet::from_mnemonic(TEST_ACCOUNT_C_MNEMONIC)?,
    })
}

async fn setup(wallet: Wallet) -> anyhow::Result<SecretClient> {
    let client = ClientBuilder::new(ChainConfig::for_network(Network::Local))
        .wallet(wallet)
        .tx_timeout(Duration::from_secs(60))
        .build()
        .await?
        .client;

    client.wait_for_chain(Duration::from_secs(60)).await?;
    Ok(client)
}

struct Snipix {
    client: SecretClient,
    contract_address: String,
    code_hash: String,
}

async fn setup_snipix(wallet: Wallet, init_msg: InitMsg) -> anyhow::Result<Snipix> {
    let client = setup(wallet).await?;

    let wasm_path = std::env::var("SNIPIX_WASM").unwrap_or_else(|_| "artifacts/snipix.wasm".to_string());
    let wasm = tokio::fs::read(&wasm_path)
        .await
        .with_context(|| format!("Failed to read {}", wasm_path))?;

    let stored = client.store_code(wasm, None, None).await?;
    let contract_address = client
        .instantiate_snip20(stored.code_id, &stored.code_hash, &init_msg)
        .await?;

    Ok(Snipix {
        client,
        contract_address,
        code_hash: stored.code_hash,
    })
}

#[tokio::test]
#[ignore = "needs a running LocalSecret"]
async fn handles_bank_transfers() -> anyhow::Result<()> {
    let Wallets { alice, bob, .. } = wallets()?;
    let client = setup(bob).await?;

    let before = client.balance(&alice.address(), DENOM).await?;

    let amount = 789_321;
    let transfer = client.bank_send(&alice.address(), amount, DENOM).await?;
    assert!(transfer.is_success());

    let after = client.balance(&alice.address(), DENOM).await?;
    assert_eq!(before + amount, after);

    Ok(())
}

#[tokio::test]
#[ignore = "needs a running LocalSecret and artifacts/snipix.wasm"]
async fn instantiates_snip20_token() -> anyhow::Result<()> {
    let Wallets { bob, .. } = wallets()?;
    let snipix = setup_snipix(bob, InitMsg::default()).await?;

    assert!(snipix.contract_address.starts_with("secret1"));

    let info = snipix
        .client
        .token_info(&snipix.contract_address, &snipix.code_hash)
        .await?;
    assert_eq!(info.symbol, "TTX");
    assert_eq!(info.decimals, 6);

    Ok(())
}

#[tokio::test]
#[ignore = "needs a running LocalSecret and artifacts/snipix.wasm"]
async fn creates_viewing_key_and_reads_balance() -> anyhow::Result<()> {
    let Wallets { alice, bob, .. } = wallets()?;

    let mut init_msg = InitMsg::default();
    init_msg.initial_balances = Some(vec![
        InitialBalance {
            address: alice.address(),
            amount: 100_000_000u128.into(),
        },
        InitialBalance {
            address: bob.address(),
            amount: 987_654_321u128.into(),
        },
    ]);

    let bob_address = bob.address();
    let snipix = setup_snipix(bob, init_msg).await?;

    let key = snipix
        .client
        .create_viewing_key(&snipix.contract_address, &snipix.code_hash, "badabing")
        .await?;

    let balance = snipix
        .client
        .snip20_balance(&snipix.contract_address, &snipix.code_hash, &bob_address, &key)
        .await?;
    assert_eq!(balance, 987_654_321);

    snipix
        .client
        .snip20_transfer(&snipix.contract_address, &snipix.code_hash, &alice.address(), 654_321, None)
        .await?;

    let balance = snipix
        .client
        .snip20_balance(&snipix.contract_address, &snipix.code_hash, &bob_address, &key)
        .await?;
    assert_eq!(balance, 987_000_000);

    Ok(())
}

#[tokio::test]
#[ignore = "needs a running LocalSecret and artifacts/snipix.wasm"]
async fn sets_and_clears_marketing_info() -> anyhow::Result<()> {
    let Wallets { bob, .. } = wallets()?;

    let logo = Logo::Url("https://assets.coingecko.com/coins/images/11871/large/Secret.png".to_string());
    let mut init_msg = InitMsg::default();
    init_msg.marketing_info = Some(MarketingInfo {
        logo: Some(logo.clone()),
        ..Default::default()
    });

    let snipix = setup_snipix(bob, init_msg).await?;

    let info = snipix
        .client
        .marketing_info(&snipix.contract_address, &snipix.code_hash)
        .await?;
    assert_eq!(info.and_then(|i| i.logo), Some(logo));

    snipix
        .client
        .set_marketing_info(&snipix.contract_address, &snipix.code_hash, None)
        .await?;

    let info = snipix
        .client
        .marketing_info(&snipix.contract_address, &snipix.code_hash)
        .await?;
    assert!(info.is_none());

    Ok(())
}
