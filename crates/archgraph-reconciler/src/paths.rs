//! Module path and import specifier handling

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Forward slashes, `.` and `..` segments folded, no leading `./`
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Path with a known source extension removed (`.d.ts` included)
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let Some(dot) = path[name_start..].rfind('.') else {
        return path;
    };
    let (base, ext) = path.split_at(name_start + dot);
    if !EXTENSIONS.contains(&&ext[1..]) {
        return path;
    }
    base.strip_suffix(".d").unwrap_or(base)
}

/// Final path segment without its extension
pub fn file_stem(path: &str) -> &str {
    let base = strip_extension(path);
    base.rsplit('/').next().unwrap_or(base)
}

/// Directory part of a path, empty for a bare file name
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Resolve `specifier` relative to the directory of `importer`
pub fn join(importer: &str, specifier: &str) -> String {
    let dir = parent_dir(importer);
    if dir.is_empty() {
        normalize(specifier)
    } else {
        normalize(&format!("{dir}/{specifier}"))
    }
}

pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Strip `root` and the separator following it from the front of `path`
pub fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return None;
    }
    path.strip_prefix(root)?.strip_prefix('/')
}

/// Path-based spellings another module might use to import the module at
/// `path`, most specific first. The bare file stem is registered separately,
/// after every path-based spelling.
pub fn spellings(path: &str, source_root: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |s: String| {
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    };

    let bare = strip_extension(path);
    let mut bases = vec![(path.to_string(), bare.to_string())];
    if let Some(rooted) = source_root.and_then(|root| strip_root(path, root)) {
        bases.push((rooted.to_string(), strip_extension(rooted).to_string()));
    }

    for (full, without_ext) in &bases {
        push(full.clone());
        push(without_ext.clone());
        push(format!("./{full}"));
        push(format!("./{without_ext}"));
        if file_stem(full) == "index" {
            let dir = parent_dir(without_ext);
            push(dir.to_string());
            if !dir.is_empty() {
                push(format!("./{dir}"));
            }
        }
    }
    out
}

/// Package an external specifier belongs to: `@scope/pkg` or `pkg`, with any
/// `node:` prefix removed
pub fn package_root(specifier: &str) -> String {
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
    let mut parts = specifier.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
        (Some(name), _) => name.to_string(),
        _ => specifier.to_string(),
    }
}

/// `@angular/core` -> `AngularCore`, `user-service` -> `UserService`
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Stem comparison ignoring case, `-` and `_`
pub fn loose_eq(a: &str, b: &str) -> bool {
    let fold = |s: &str| -> String {
        s.chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    fold(a) == fold(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./src//a/../b.ts"), "src/b.ts");
        assert_eq!(normalize("src\\win\\path.ts"), "src/win/path.ts");
        assert_eq!(normalize("../up/x"), "../up/x");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("src/main.ts"), "src/main");
        assert_eq!(strip_extension("src/types.d.ts"), "src/types");
        assert_eq!(strip_extension("src/v1.2/readme"), "src/v1.2/readme");
        assert_eq!(strip_extension("lib/jquery.min"), "lib/jquery.min");
        assert_eq!(file_stem("src/user-service.tsx"), "user-service");
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join("src/app/main.ts", "../services/user"), "src/services/user");
        assert_eq!(join("main.ts", "./util"), "util");
        assert!(is_relative("./x"));
        assert!(is_relative("../x"));
        assert!(!is_relative("lodash"));
        assert!(!is_relative("@/services/x"));
    }

    #[test]
    fn test_spellings() {
        let spellings = spellings("src/services/index.ts", Some("src"));
        for expected in [
            "src/services/index.ts",
            "src/services/index",
            "./src/services/index",
            "src/services",
            "services/index",
            "services",
            "./services",
        ] {
            assert!(spellings.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!spellings.contains(&"index".to_string()));
    }

    #[test]
    fn test_package_root() {
        assert_eq!(package_root("lodash/debounce"), "lodash");
        assert_eq!(package_root("@angular/core/testing"), "@angular/core");
        assert_eq!(package_root("node:fs/promises"), "fs");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("@angular/core"), "AngularCore");
        assert_eq!(pascal_case("lodash"), "Lodash");
        assert_eq!(pascal_case("user-service"), "UserService");
        assert!(loose_eq("user-service", "UserService"));
        assert!(!loose_eq("user", "UserService"));
    }
}
