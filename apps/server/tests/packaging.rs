use lvai_server::healthcheck::ProbePolicy;
use std::path::Path;

const DOCKERFILE: &str = include_str!("../../../Dockerfile");

fn flag(line: &str, name: &str) -> Option<u64> {
    let value = line.split_whitespace().find_map(|word| word.strip_prefix(&format!("--{name}=")))?;
    value.trim_end_matches('s').parse().ok()
}

#[test]
fn image_healthcheck_matches_the_probe_policy() {
    let line = DOCKERFILE.lines().find(|line| line.starts_with("HEALTHCHECK")).unwrap();
    let policy = ProbePolicy::default();

    assert_eq!(flag(line, "interval"), Some(policy.interval.as_secs()));
    assert_eq!(flag(line, "timeout"), Some(policy.timeout.as_secs()));
    assert_eq!(flag(line, "start-period"), Some(policy.start_period.as_secs()));
    assert_eq!(flag(line, "retries"), Some(u64::from(policy.retries)));
    assert!(DOCKERFILE.contains(r#"CMD ["lvai-server", "healthcheck"]"#));
    assert!(DOCKERFILE.contains("EXPOSE 8000"));
}

#[test]
fn builder_copies_only_what_the_checkout_has() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");

    let sources: Vec<&str> = DOCKERFILE
        .lines()
        .filter(|line| line.starts_with("COPY ") && !line.contains("--from="))
        .flat_map(|line| {
            let words: Vec<&str> = line.split_whitespace().skip(1).collect();
            words[..words.len() - 1].to_vec()
        })
        .collect();
    assert!(sources.contains(&"Cargo.toml"));

    for source in sources.iter().filter(|source| !source.contains('*')) {
        assert!(root.join(source).exists(), "{source} is copied but missing");
    }
}

#[test]
fn release_build_is_locked_to_a_resolved_lockfile() {
    let generate = DOCKERFILE.find("cargo generate-lockfile").unwrap();
    let build = DOCKERFILE.find("cargo build --release --locked").unwrap();
    assert!(generate < build);
    assert!(DOCKERFILE.contains("test -f Cargo.lock ||"));
}
