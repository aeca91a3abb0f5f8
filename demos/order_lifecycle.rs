//! Order lifecycle example.
//!
//! This example demonstrates:
//! - Loading a workflow definition from JSON
//! - Parallel routing: paying splits the order into billing and packing
//! - Guards deciding which transitions are open
//! - Auto-advancing with `process`
//! - Observing workflow events and printing status
//!
//! Run with: `cargo run --example order_lifecycle`
//! Set `RUST_LOG=petriflow=debug` to see why transitions are blocked.

use serde_json::json;
use tracing_subscriber::EnvFilter;

use petriflow::{DefinitionConfig, Result, Workflow, WorkflowEvent};

const ORDER_WORKFLOW: &str = r#"{
    "places": ["cart", "pending", "invoiced", "packing", "packed", "shipped", "cancelled"],
    "transitions": [
        { "name": "checkout", "from": "cart", "to": "pending",
          "guards": ["items > 0"] },
        { "name": "pay", "from": "pending", "to": ["invoiced", "packing"],
          "guards": ["payment === \"captured\""] },
        { "name": "cancel", "from": "pending", "to": "cancelled",
          "guards": ["payment === \"declined\""] },
        { "name": "pack", "from": "packing", "to": "packed" },
        { "name": "ship", "from": ["invoiced", "packed"], "to": "shipped" }
    ]
}"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔═══════════════════════════════════════════╗");
    println!("║  Petriflow Order Lifecycle Example        ║");
    println!("╚═══════════════════════════════════════════╝\n");

    println!("📋 Loading workflow definition...");
    let definition = DefinitionConfig::from_json_str(ORDER_WORKFLOW)?.into_definition()?;
    println!(
        "   Places: {}, transitions: {}\n",
        definition.places().len(),
        definition.transitions().len()
    );
    let workflow = Workflow::new("orders", definition);

    let mut event_receiver = workflow.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(event) = event_receiver.recv().await {
            match event {
                WorkflowEvent::StateInitialized { marking, .. } => {
                    println!("   [Event] Entered workflow at {:?}", marking.as_map());
                }
                WorkflowEvent::TransitionApplied { transition, .. } => {
                    println!("   [Event] Fired '{}'", transition);
                }
                WorkflowEvent::TransitionBlocked { transition, .. } => {
                    println!("   [Event] Refused '{}'", transition);
                }
                WorkflowEvent::ProcessCompleted { applied, .. } => {
                    println!("   [Event] Auto-advance applied {:?}", applied);
                }
                _ => {}
            }
        }
    });

    let mut order = json!({ "id": "order-42", "items": 3, "payment": "pending" });
    println!("📦 Processing {}\n", order["id"]);

    println!("▶️  Auto-advance (checkout)");
    println!("─────────────────────────────────────────");
    workflow.process(&mut order)?;

    println!("\n📊 Status while awaiting payment:");
    println!("─────────────────────────────────────────");
    println!("{}", workflow.status(&mut order)?);

    println!("💳 Payment captured");
    order["payment"] = json!("captured");
    workflow.apply(&mut order, "pay")?;

    println!("\n▶️  Auto-advance (packing and shipping)");
    println!("─────────────────────────────────────────");
    let applied = workflow.process(&mut order)?;
    println!(
        "   Applied: {}",
        applied.iter().map(|t| t.name()).collect::<Vec<_>>().join(" → ")
    );

    println!("\n📊 Final Status:");
    println!("─────────────────────────────────────────");
    let status = workflow.status(&mut order)?;
    println!("{}", status);
    println!("   Stored marking: {}", order["marker"]);

    if workflow.apply(&mut order, "cancel").is_err() {
        println!("   Shipped orders cannot be cancelled.");
    }

    if status.is_terminal() {
        println!("\n🎉 Order delivered!\n");
    }

    drop(workflow);
    let _ = listener.await;

    Ok(())
}
