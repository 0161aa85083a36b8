//! Decoding of name strings.
//!
//! Unicode and Windows records are UTF-16BE; Macintosh records use one of the eight-bit Mac
//! encodings, which map 0x00..=0x7F to ASCII and the upper half through the tables below.

/// An encoding a name record can be decoded with.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    Utf16Be,
    MacEightBit(&'static str, &'static [char; 128]),
}

impl Encoding {
    /// Selects the encoding of a name record. Macintosh records are looked up by language
    /// first, since several languages share a script but not an encoding.
    pub fn for_record(platform_id: u16, encoding_id: u16, language_id: u16) -> Option<Self> {
        match (platform_id, encoding_id) {
            (0, _) | (3, 0) | (3, 1) | (3, 10) => Some(Encoding::Utf16Be),
            (1, _) => mac_language_encoding(language_id)
                .or_else(|| mac_script_encoding(encoding_id))
                .map(|(name, table)| Encoding::MacEightBit(name, table)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf16Be => "utf-16be",
            Encoding::MacEightBit(name, _) => name,
        }
    }

    pub fn decode(&self, data: &[u8]) -> String {
        match self {
            Encoding::Utf16Be => decode_utf16_be(data),
            Encoding::MacEightBit(_, table) => data
                .iter()
                .map(|b| match b {
                    0x00..=0x7F => char::from(*b),
                    _ => table[usize::from(b & 0x7F)],
                })
                .collect(),
        }
    }
}

/// Decodes UTF-16BE, replacing unpaired surrogates. A trailing odd byte is ignored.
pub fn decode_utf16_be(data: &[u8]) -> String {
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn mac_language_encoding(language_id: u16) -> Option<(&'static str, &'static [char; 128])> {
    Some(match language_id {
        15 | 30 => ("x-mac-icelandic", &X_MAC_ICELANDIC),
        17 => ("x-mac-turkish", &X_MAC_TURKISH),
        18 => ("x-mac-croatian", &X_MAC_CROATIAN),
        24..=28 | 38..=40 => ("x-mac-ce", &X_MAC_CE),
        37 => ("x-mac-romanian", &X_MAC_ROMANIAN),
        143 => ("x-mac-inuit", &X_MAC_INUIT),
        146 => ("x-mac-gaelic", &X_MAC_GAELIC),
        _ => return None,
    })
}

fn mac_script_encoding(script_id: u16) -> Option<(&'static str, &'static [char; 128])> {
    Some(match script_id {
        0 => ("macintosh", &MACINTOSH),
        6 => ("x-mac-greek", &X_MAC_GREEK),
        7 => ("x-mac-cyrillic", &X_MAC_CYRILLIC),
        29 => ("x-mac-ce", &X_MAC_CE),
        _ => return None,
    })
}

const X_MAC_CROATIAN: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', 'Š', '™', '´', '¨', '≠', 'Ž', 'Ø',
    '∞', '±', '≤', '≥', '∆', 'µ', '∂', '∑',
    '∏', 'š', '∫', 'ª', 'º', 'Ω', 'ž', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', 'Ć', '«',
    'Č', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    'Đ', '—', '“', '”', '‘', '’', '÷', '◊',
    '\u{F8FF}', '©', '⁄', '€', '‹', '›', 'Æ', '»',
    '–', '·', '‚', '„', '‰', 'Â', 'ć', 'Á',
    'č', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    'đ', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜',
    '¯', 'π', 'Ë', '˚', '¸', 'Ê', 'æ', 'ˇ',
];

const X_MAC_CYRILLIC: [char; 128] = [
    'А', 'Б', 'В', 'Г', 'Д', 'Е', 'Ж', 'З',
    'И', 'Й', 'К', 'Л', 'М', 'Н', 'О', 'П',
    'Р', 'С', 'Т', 'У', 'Ф', 'Х', 'Ц', 'Ч',
    'Ш', 'Щ', 'Ъ', 'Ы', 'Ь', 'Э', 'Ю', 'Я',
    '†', '°', 'Ґ', '£', '§', '•', '¶', 'І',
    '®', '©', '™', 'Ђ', 'ђ', '≠', 'Ѓ', 'ѓ',
    '∞', '±', '≤', '≥', 'і', 'µ', 'ґ', 'Ј',
    'Є', 'є', 'Ї', 'ї', 'Љ', 'љ', 'Њ', 'њ',
    'ј', 'Ѕ', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'Ћ', 'ћ', 'Ќ', 'ќ', 'ѕ',
    '–', '—', '“', '”', '‘', '’', '÷', '„',
    'Ў', 'ў', 'Џ', 'џ', '№', 'Ё', 'ё', 'я',
    'а', 'б', 'в', 'г', 'д', 'е', 'ж', 'з',
    'и', 'й', 'к', 'л', 'м', 'н', 'о', 'п',
    'р', 'с', 'т', 'у', 'ф', 'х', 'ц', 'ч',
    'ш', 'щ', 'ъ', 'ы', 'ь', 'э', 'ю', '€',
];

const X_MAC_GAELIC: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    'Ḃ', '±', '≤', '≥', 'ḃ', 'Ċ', 'ċ', 'Ḋ',
    'ḋ', 'Ḟ', 'ḟ', 'Ġ', 'ġ', 'Ṁ', 'æ', 'ø',
    'ṁ', 'Ṗ', 'ṗ', 'ɼ', 'ƒ', 'ſ', 'Ṡ', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', 'ṡ', 'ẛ',
    'ÿ', 'Ÿ', 'Ṫ', '€', '‹', '›', 'Ŷ', 'ŷ',
    'ṫ', '·', 'Ỳ', 'ỳ', '⁊', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '♣', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'Ý', 'ý',
    'Ŵ', 'ŵ', 'Ẅ', 'ẅ', 'Ẁ', 'ẁ', 'Ẃ', 'ẃ',
];

const X_MAC_GREEK: [char; 128] = [
    'Ä', '¹', '²', 'É', '³', 'Ö', 'Ü', '΅',
    'à', 'â', 'ä', '΄', '¨', 'ç', 'é', 'è',
    'ê', 'ë', '£', '™', 'î', 'ï', '•', '½',
    '‰', 'ô', 'ö', '¦', '€', 'ù', 'û', 'ü',
    '†', 'Γ', 'Δ', 'Θ', 'Λ', 'Ξ', 'Π', 'ß',
    '®', '©', 'Σ', 'Ϊ', '§', '≠', '°', '·',
    'Α', '±', '≤', '≥', '¥', 'Β', 'Ε', 'Ζ',
    'Η', 'Ι', 'Κ', 'Μ', 'Φ', 'Ϋ', 'Ψ', 'Ω',
    'ά', 'Ν', '¬', 'Ο', 'Ρ', '≈', 'Τ', '«',
    '»', '…', '\u{A0}', 'Υ', 'Χ', 'Ά', 'Έ', 'œ',
    '–', '―', '“', '”', '‘', '’', '÷', 'Ή',
    'Ί', 'Ό', 'Ύ', 'έ', 'ή', 'ί', 'ό', 'Ώ',
    'ύ', 'α', 'β', 'ψ', 'δ', 'ε', 'φ', 'γ',
    'η', 'ι', 'ξ', 'κ', 'λ', 'μ', 'ν', 'ο',
    'π', 'ώ', 'ρ', 'σ', 'τ', 'θ', 'ω', 'ς',
    'χ', 'υ', 'ζ', 'ϊ', 'ϋ', 'ΐ', 'ΰ', '\u{AD}',
];

const X_MAC_ICELANDIC: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    'Ý', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑',
    '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ÿ', 'Ÿ', '⁄', '€', 'Ð', 'ð', 'Þ', 'þ',
    'ý', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜',
    '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

const X_MAC_INUIT: [char; 128] = [
    'ᐃ', 'ᐄ', 'ᐅ', 'ᐆ', 'ᐊ', 'ᐋ', 'ᐱ', 'ᐲ',
    'ᐳ', 'ᐴ', 'ᐸ', 'ᐹ', 'ᑉ', 'ᑎ', 'ᑏ', 'ᑐ',
    'ᑑ', 'ᑕ', 'ᑖ', 'ᑦ', 'ᑭ', 'ᑮ', 'ᑯ', 'ᑰ',
    'ᑲ', 'ᑳ', 'ᒃ', 'ᒋ', 'ᒌ', 'ᒍ', 'ᒎ', 'ᒐ',
    'ᒑ', '°', 'ᒡ', 'ᒥ', 'ᒦ', '•', '¶', 'ᒧ',
    '®', '©', '™', 'ᒨ', 'ᒪ', 'ᒫ', 'ᒻ', 'ᓂ',
    'ᓃ', 'ᓄ', 'ᓅ', 'ᓇ', 'ᓈ', 'ᓐ', 'ᓯ', 'ᓰ',
    'ᓱ', 'ᓲ', 'ᓴ', 'ᓵ', 'ᔅ', 'ᓕ', 'ᓖ', 'ᓗ',
    'ᓘ', 'ᓚ', 'ᓛ', 'ᓪ', 'ᔨ', 'ᔩ', 'ᔪ', 'ᔫ',
    'ᔭ', '…', '\u{A0}', 'ᔮ', 'ᔾ', 'ᕕ', 'ᕖ', 'ᕗ',
    '–', '—', '“', '”', '‘', '’', 'ᕘ', 'ᕙ',
    'ᕚ', 'ᕝ', 'ᕆ', 'ᕇ', 'ᕈ', 'ᕉ', 'ᕋ', 'ᕌ',
    'ᕐ', 'ᕿ', 'ᖀ', 'ᖁ', 'ᖂ', 'ᖃ', 'ᖄ', 'ᖅ',
    'ᖏ', 'ᖐ', 'ᖑ', 'ᖒ', 'ᖓ', 'ᖔ', 'ᖕ', 'ᙱ',
    'ᙲ', 'ᙳ', 'ᙴ', 'ᙵ', 'ᙶ', 'ᖖ', 'ᖠ', 'ᖡ',
    'ᖢ', 'ᖣ', 'ᖤ', 'ᖥ', 'ᖦ', 'ᕼ', 'Ł', 'ł',
];

const X_MAC_CE: [char; 128] = [
    'Ä', 'Ā', 'ā', 'É', 'Ą', 'Ö', 'Ü', 'á',
    'ą', 'Č', 'ä', 'č', 'Ć', 'ć', 'é', 'Ź',
    'ź', 'Ď', 'í', 'ď', 'Ē', 'ē', 'Ė', 'ó',
    'ė', 'ô', 'ö', 'õ', 'ú', 'Ě', 'ě', 'ü',
    '†', '°', 'Ę', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', 'ę', '¨', '≠', 'ģ', 'Į',
    'į', 'Ī', '≤', '≥', 'ī', 'Ķ', '∂', '∑',
    'ł', 'Ļ', 'ļ', 'Ľ', 'ľ', 'Ĺ', 'ĺ', 'Ņ',
    'ņ', 'Ń', '¬', '√', 'ń', 'Ň', '∆', '«',
    '»', '…', '\u{A0}', 'ň', 'Ő', 'Õ', 'ő', 'Ō',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ō', 'Ŕ', 'ŕ', 'Ř', '‹', '›', 'ř', 'Ŗ',
    'ŗ', 'Š', '‚', '„', 'š', 'Ś', 'ś', 'Á',
    'Ť', 'ť', 'Í', 'Ž', 'ž', 'Ū', 'Ó', 'Ô',
    'ū', 'Ů', 'Ú', 'ů', 'Ű', 'ű', 'Ų', 'ų',
    'Ý', 'ý', 'ķ', 'Ż', 'Ł', 'ż', 'Ģ', 'ˇ',
];

const MACINTOSH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑',
    '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜',
    '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

const X_MAC_ROMANIAN: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Ă', 'Ș',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑',
    '∏', 'π', '∫', 'ª', 'º', 'Ω', 'ă', 'ș',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'Ț', 'ț',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜',
    '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

const X_MAC_TURKISH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á',
    'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó',
    'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß',
    '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑',
    '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«',
    '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊',
    'ÿ', 'Ÿ', 'Ğ', 'ğ', 'İ', 'ı', 'Ş', 'ş',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', '\u{F8A0}', 'ˆ', '˜',
    '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_utf16_be() {
        assert_eq!(decode_utf16_be(&[0x00, 0x41, 0x00, 0xE9, 0xD8, 0x3D, 0xDE, 0x00]), "Aé😀");
        assert_eq!(decode_utf16_be(&[0x00, 0x41, 0x00]), "A");
        assert_eq!(decode_utf16_be(&[0xD8, 0x3D]), "\u{FFFD}");
    }

    #[test]
    fn test_encoding_selection() {
        assert_eq!(Encoding::for_record(3, 1, 0x0409), Some(Encoding::Utf16Be));
        assert_eq!(Encoding::for_record(0, 3, 0), Some(Encoding::Utf16Be));
        assert_eq!(Encoding::for_record(1, 0, 0).unwrap().name(), "macintosh");
        // Icelandic is written in the Roman script but has its own encoding
        assert_eq!(Encoding::for_record(1, 0, 15).unwrap().name(), "x-mac-icelandic");
        assert_eq!(Encoding::for_record(1, 7, 32).unwrap().name(), "x-mac-cyrillic");
        assert_eq!(Encoding::for_record(1, 1, 11), None);
        assert_eq!(Encoding::for_record(2, 0, 0), None);
    }

    #[test]
    fn test_mac_eight_bit() {
        let roman = Encoding::for_record(1, 0, 0).unwrap();
        assert_eq!(roman.decode(b"Caf\x8E \xA9"), "Café ©");
        let cyrillic = Encoding::for_record(1, 7, 32).unwrap();
        assert_eq!(cyrillic.decode(&[0x80, 0x81, 0xFF]), "АБ€");
    }
}
