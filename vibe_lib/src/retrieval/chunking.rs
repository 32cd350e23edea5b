use crate::error::Error;

/// Split `text` into consecutive pieces of `chunk_size` characters.
///
/// The last piece may be shorter. Pieces borrow from `text` and concatenate
/// back to it exactly; sizes count `char`s so multi-byte text is never cut
/// inside a code point.
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<&str>, Error> {
    if chunk_size == 0 {
        return Err(Error::InvalidArgument("chunk size must be greater than zero"));
    }

    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_and_concat() {
        let text = "abcdefghij".repeat(7) + "xyz";
        for size in [1, 3, 10, 50, 73, 500] {
            let chunks = chunk_text(&text, size).unwrap();
            assert_eq!(chunks.len(), text.len().div_ceil(size), "size {size}");
            assert_eq!(chunks.concat(), text);
            assert!(chunks[..chunks.len() - 1].iter().all(|c| c.len() == size));
            assert!(chunks.last().unwrap().len() <= size);
        }
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "héllo wörld ✅ done";
        let chunks = chunk_text(text, 4).unwrap();
        assert_eq!(chunks.len(), text.chars().count().div_ceil(4));
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[0], "héll");
    }

    #[test]
    fn test_empty_and_zero() {
        assert!(chunk_text("", 10).unwrap().is_empty());
        assert!(matches!(chunk_text("abc", 0), Err(Error::InvalidArgument(_))));
    }
}
