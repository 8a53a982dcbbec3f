//! Shows what a memo that forgets its insertions does to a deep copy.
//!
//! Usage: `memo-demo [STRATEGY]` where STRATEGY is one of the registered memo
//! names (default: forgetful). Set `RUST_LOG=memocopy=trace` to watch memo traffic.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use memocopy::registry;
use memocopy::{
    deep_copy_with, CopyConfig, ForgetfulMemo, Heap, Memo, MemoTable, Value,
};

fn ids(heap: &Heap, label: &str, root: &Value) {
    println!("id({label})={}", id_of(root));
    if let Some(id) = root.as_obj() {
        for i in 0..heap.get(id).len() {
            if let Some(child) = heap.child(id, i) {
                println!("id({label}[{i}])={}", id_of(child));
            }
        }
    }
}

fn id_of(value: &Value) -> String {
    match value.as_obj() {
        Some(id) => id.to_string(),
        None => "<atom>".to_string(),
    }
}

fn same(heap: &Heap, root: &Value, i: usize, j: usize) -> bool {
    let Some(id) = root.as_obj() else {
        return false;
    };
    match (heap.child(id, i), heap.child(id, j)) {
        (Some(a), Some(b)) => heap.is_same(a, b),
        _ => false,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let strategy = std::env::args().nth(1).unwrap_or_else(|| "forgetful".to_string());
    let Some(mut alt_memo) = registry::build(&strategy) else {
        eprintln!("unknown memo strategy '{strategy}'; registered:");
        for s in registry::strategies() {
            eprintln!("  {:<10} {}", s.name, s.description);
        }
        return ExitCode::FAILURE;
    };

    let config = match CopyConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut heap = Heap::new();
    let a = heap.record("T", vec![]);
    let b = heap.record("T", vec![]);
    let original: Value = heap.list(vec![a.into(), a.into(), b.into()]).into();
    ids(&heap, "original_list", &original);

    let mut memo_normal = MemoTable::new();
    let copied_normal = match deep_copy_with(&mut heap, &original, &mut memo_normal, config) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    println!("\n");
    ids(&heap, "copied_list_normal", &copied_normal);
    println!("memo_normal=");
    let mut entries: Vec<_> = memo_normal.iter().collect();
    entries.sort();
    for (src, copy) in entries {
        println!("  {src}: {}", heap.render(&copy.into()));
    }

    let copied_alt = match deep_copy_with(&mut heap, &original, &mut alt_memo, config) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    println!("\n");
    ids(&heap, &format!("copied_list_{strategy}"), &copied_alt);
    println!("memo_{strategy} entries={}", alt_memo.len());

    println!("{}", same(&heap, &copied_alt, 0, 1));
    println!("{}", same(&heap, &copied_normal, 0, 1));

    // recursive_list = [1, 2]; recursive_list.append(recursive_list)
    let limited = config.with_recursion_limit(100);
    let recursive = heap.list(vec![Value::int(1), Value::int(2)]);
    heap.push_child(recursive, recursive.into());
    let recursive: Value = recursive.into();

    let mut standard = MemoTable::new();
    match deep_copy_with(&mut heap, &recursive, &mut standard, limited) {
        Ok(copied) => println!("copied_list = {}", heap.render(&copied)),
        Err(err) => println!("standard memo: {err}"),
    }

    let mut forgetful = ForgetfulMemo::new();
    match deep_copy_with(&mut heap, &recursive, &mut forgetful, limited) {
        Ok(copied) => println!("copied_list = {}", heap.render(&copied)),
        Err(err) => println!(
            "forgetful memo: {err} after discarding {} inserts",
            forgetful.discarded()
        ),
    }

    ExitCode::SUCCESS
}
