// Entry point for the node launcher. `start` runs a single node on the
// calling thread; `demo` hosts a small three-node network in one process
// and drives transactions through it.
use clap::Parser;
use log::{error, info, LevelFilter};
use meshchain::{
    genesis_private_key, hash_transaction, network, sign_transaction, Command, Node, NodeConfig,
    Opt, PeerClient, PrivateKey, Transaction, TxInput, TxOutput, GENESIS_AMOUNT,
};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Start {
            listen,
            bootstrap,
            validator,
            seed,
        } => {
            let listen_addr = listen.unwrap_or_else(meshchain::default_listen_addr);
            let mut config = NodeConfig::new(listen_addr).with_bootstrap(bootstrap);

            // --seed pins the validator identity; --validator alone gets a
            // fresh key each start
            if let Some(seed_hex) = seed {
                config = config.with_validator(PrivateKey::from_hex(&seed_hex)?);
            } else if validator {
                config = config.with_validator(PrivateKey::generate()?);
            }

            let node = Node::new(config)?;
            network::run(node)?;
        }
        Command::Demo => run_demo()?,
    }
    Ok(())
}

// Three nodes in one process: a validator on :3000, :4000 bootstrapping
// from it, :6000 bootstrapping from :4000. Discovery is transitive, so all
// three end up fully meshed, and a transaction submitted anywhere reaches
// the validator.
fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let addrs = ["127.0.0.1:3000", "127.0.0.1:4000", "127.0.0.1:6000"];

    let configs = vec![
        NodeConfig::new(addrs[0]).with_validator(PrivateKey::generate()?),
        NodeConfig::new(addrs[1]).with_bootstrap(vec![addrs[0].to_string()]),
        NodeConfig::new(addrs[2]).with_bootstrap(vec![addrs[1].to_string()]),
    ];

    let mut nodes = Vec::new();
    for config in configs {
        let node = Node::new(config)?;
        nodes.push(Arc::clone(&node));
        thread::spawn(move || {
            if let Err(e) = network::run(node) {
                error!("node failed: {e}");
            }
        });
        // stagger startup so each bootstrap target is already listening
        thread::sleep(Duration::from_millis(200));
    }

    thread::sleep(Duration::from_secs(1));
    for node in &nodes {
        info!(
            "demo node {} sees peers {:?}",
            node.listen_addr(),
            node.peer_list()
        );
    }

    // Walk the genesis output through a chain of spends, submitting each
    // one to the non-validator on :4000 and letting gossip carry it.
    let genesis_key = genesis_private_key();
    let client = PeerClient::new(addrs[1]);
    let genesis_block = nodes[0].chain().get_block_by_height(0)?;
    let mut prev_tx_hash = hash_transaction(&genesis_block.transactions[0])?;
    let mut prev_out_index = 0u32;
    let mut balance = GENESIS_AMOUNT;

    while balance > 1 {
        let recipient = PrivateKey::generate()?;
        let mut tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                prev_tx_hash: prev_tx_hash.clone(),
                prev_out_index,
                public_key: genesis_key.public().to_vec(),
                signature: vec![],
            }],
            outputs: vec![
                TxOutput {
                    amount: 1,
                    address: recipient.public().address().to_vec(),
                },
                TxOutput {
                    amount: balance - 1,
                    address: genesis_key.public().address().to_vec(),
                },
            ],
        };
        let signature = sign_transaction(genesis_key, &tx)?;
        tx.inputs[0].signature = signature.to_vec();

        client.handle_transaction(&tx)?;
        info!(
            "demo submitted transaction, {} remaining on the genesis chain",
            balance - 1
        );

        // the change output funds the next round, once it has been mined
        prev_tx_hash = hash_transaction(&tx)?;
        prev_out_index = 1;
        balance -= 1;
        thread::sleep(meshchain::BLOCK_TIME + Duration::from_secs(1));
    }

    Ok(())
}
