/// Turns a form title into a URL slug: accents folded, non-alphanumeric runs collapsed to `-`,
/// lower-cased. Falls back to `form` when nothing usable remains.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars().flat_map(fold_char) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "form".to_string()
    } else {
        slug
    }
}

/// `base`, or `base-1`, `base-2`, … until `taken` reports a free slug.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|attempt| format!("{base}-{attempt}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Maps accented and special Latin letters to ASCII through a fixed table.
///
/// This is not a full Unicode decomposition: letters without decomposition such as `ı`,
/// `ł`, `ø` and `đ` still get their ASCII base letter, and anything outside the table
/// becomes a separator.
fn fold_char(c: char) -> Vec<char> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'đ' | 'ď' => 'd',
        'Đ' | 'Ď' => 'D',
        'ę' | 'ě' => 'e',
        'Ę' | 'Ě' => 'E',
        'ğ' => 'g',
        'Ğ' => 'G',
        'ì' | 'í' | 'î' | 'ï' | 'ı' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'İ' => 'I',
        'ł' => 'l',
        'Ł' => 'L',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ř' => 'r',
        'Ř' => 'R',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ő' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ő' | 'Ø' => 'O',
        'ş' | 'ś' | 'š' => 's',
        'Ş' | 'Ś' | 'Š' => 'S',
        'ù' | 'ú' | 'û' | 'ü' | 'ű' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ű' => 'U',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        'ß' => return vec!['s', 's'],
        'æ' => return vec!['a', 'e'],
        'Æ' => return vec!['A', 'E'],
        'œ' => return vec!['o', 'e'],
        'Œ' => return vec!['O', 'E'],
        other => other,
    };
    vec![folded]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_title() {
        assert_eq!(slugify("Senior Backend Engineer"), "senior-backend-engineer");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Yazılım Geliştirici Başvurusu"), "yazilim-gelistirici-basvurusu");
        assert_eq!(slugify("Café Straße"), "cafe-strasse");
    }

    #[test]
    fn test_slugify_folds_letters_without_decomposition() {
        assert_eq!(slugify("Łódź Dyrektor"), "lodz-dyrektor");
        assert_eq!(slugify("Győr Fejlesztő"), "gyor-fejleszto");
        assert_eq!(slugify("Søren Œuvre"), "soren-oeuvre");
        assert_eq!(slugify("Işık"), "isik");
    }

    #[test]
    fn test_slugify_unknown_letters_become_separators() {
        assert_eq!(slugify("Dev 開発 Team"), "dev-team");
    }

    #[test]
    fn test_slugify_trims_and_collapses_separators() {
        assert_eq!(slugify("  --Rust // Go!!  "), "rust-go");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "form");
        assert_eq!(slugify(""), "form");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        let taken = ["intern", "intern-1"];
        assert_eq!(unique_slug("intern", |s| taken.contains(&s)), "intern-2");
        assert_eq!(unique_slug("designer", |s| taken.contains(&s)), "designer");
    }
}
