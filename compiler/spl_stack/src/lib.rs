//! Host stack growth for the SPL tree walker.
//!
//! `evaluate` recurses once per AST level and once per SPL function call, so a
//! deeply recursive script can exhaust the native stack long before the
//! interpreter's own call-depth limit fires. Every recursive entry point wraps
//! its body in [`ensure_sufficient_stack`], which allocates a fresh stack
//! segment whenever the remaining space drops under the red zone.
//!
//! On `wasm32` the function is a plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the host stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Nested {
        Leaf(i64),
        Wrap(Box<Nested>),
    }

    fn depth(node: &Nested) -> i64 {
        ensure_sufficient_stack(|| match node {
            Nested::Leaf(v) => *v,
            Nested::Wrap(inner) => depth(inner) + 1,
        })
    }

    fn build(levels: usize) -> Nested {
        let mut node = Nested::Leaf(0);
        for _ in 0..levels {
            node = Nested::Wrap(Box::new(node));
        }
        node
    }

    #[test]
    fn test_shallow_tree() {
        assert_eq!(depth(&build(16)), 16);
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        let tree = build(200_000);
        assert_eq!(depth(&tree), 200_000);
        // Dropping a 200k-deep Box chain recursively would overflow on its own.
        let mut cursor = tree;
        while let Nested::Wrap(inner) = cursor {
            cursor = *inner;
        }
    }

    #[test]
    fn test_passes_result_through() {
        let out: Result<i64, String> = ensure_sufficient_stack(|| Err("boom".to_string()));
        assert_eq!(out, Err("boom".to_string()));
    }
}
