use std::{fs, path::Path};

pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, contents).expect("write fixture");
}

/// A small content tree touching every kind and data file.
pub fn sample_content(root: &Path) {
    write(
        root,
        "blog/fearless-concurrency.md",
        r#"---
title: "Fearless Concurrency"
description: "Threads without data races"
date: "2024-05-01"
tags: ["rust", "concurrency"]
category: "Rust"
series: "rust-basics"
faqs:
  - question: "Is it really fearless?"
    answer: "Mostly, the compiler **helps**."
---
## Threads

Spawn a thread with `std::thread::spawn`.

```rust
fn main() {
    std::thread::spawn(|| println!("hi"));
}
```

## Channels

Send values between threads.
"#,
    );
    write(
        root,
        "blog/ownership.md",
        r#"---
title: "Ownership"
description: "Who owns what"
date: "2024-04-01"
tags: ["rust"]
---
Every value has one owner.
"#,
    );
    write(
        root,
        "blog/unfinished.md",
        r#"---
title: "Unfinished"
date: "2024-06-01"
draft: true
---
Not ready.
"#,
    );
    write(
        root,
        "silly-questions/why-is-the-sky-blue.md",
        r#"---
question: "Why is the sky blue?"
date: "2024-03-10"
tags: ["physics"]
---
Rayleigh scattering.
"#,
    );
    write(
        root,
        "til/cargo-tree.md",
        r#"---
title: "cargo tree shows duplicates"
date: "2024-05-02"
tags: ["rust", "cargo"]
---
Use `cargo tree -d`.
"#,
    );
    write(
        root,
        "technical-terms/mutex.md",
        r#"---
title: "Mutex"
description: "Mutual exclusion lock"
aliases: ["lock"]
related: ["Arc"]
---
A mutex guards shared data.
"#,
    );
    write(
        root,
        "technical-terms/arc.md",
        r#"---
title: "Arc"
description: "Atomically reference counted pointer"
---
Shared ownership across threads.
"#,
    );
    write(
        root,
        "data/cheatsheets.json",
        r#"[{"title": "Git Basics", "description": "Everyday git", "sections": [{"title": "Status", "code": "git status", "language": "bash"}]}]"#,
    );
    write(
        root,
        "data/series.json",
        r#"[{"slug": "rust-basics", "title": "Rust Basics", "posts": ["ownership", "fearless-concurrency"]}]"#,
    );
    write(
        root,
        "data/topics.json",
        r#"[{"slug": "rust", "title": "Rust", "description": "All things Rust", "tags": ["rust"]}]"#,
    );
    write(
        root,
        "data/uses.json",
        r#"[{"title": "Editor", "items": [{"name": "Helix", "description": "Modal editor", "url": "https://helix-editor.com"}]}]"#,
    );
    write(
        root,
        "data/glossary.json",
        r#"[{"term": "RAII", "definition": "Resource acquisition is initialization"}]"#,
    );
}
