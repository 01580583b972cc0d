// Reference/subtitle pairs with known corrected output
// WHY: golden-file testing needs deterministic input/output pairs

#![allow(dead_code)]

/// Clean reference with dialog quotes, sentence punctuation and paragraph breaks
pub const REFERENCE_TEXT: &str = r#"Chapter One

"Where are you going?" asked Mary. The rain had not stopped since morning, and the road was thick with mud.

"To the station," said Tom. "The last train leaves at nine.""#;

/// Speech-recognition style subtitles: lowercase, no punctuation, one misheard segment and
/// one outro line absent from the reference
pub const NOISY_SRT: &str = "1
00:00:01,000 --> 00:00:03,200
where are you going asked mary

2
00:00:03,400 --> 00:00:06,000
the rain had not stopped since morning

3
00:00:06,100 --> 00:00:08,500
adn teh road was thick with mud

4
00:00:09,000 --> 00:00:10,800
to the station said tom

5
00:00:11,000 --> 00:00:13,000
the last train leaves at nine

6
00:00:14,000 --> 00:00:15,500
thank you for watching

";

/// Expected output for NOISY_SRT against REFERENCE_TEXT with default settings
pub const CORRECTED_SRT: &str = r#"1
00:00:01,000 --> 00:00:03,200
"Where are you going?" asked Mary.

2
00:00:03,400 --> 00:00:06,000
The rain had not stopped since morning,

3
00:00:06,100 --> 00:00:08,500
and the road was thick with mud.

4
00:00:09,000 --> 00:00:10,800
"To the station," said Tom.

5
00:00:11,000 --> 00:00:13,000
"The last train leaves at nine."

6
00:00:14,000 --> 00:00:15,500
thank you for watching

"#;

/// Subtitle whose text spans a paragraph break in the reference
pub const PARAGRAPH_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
thick with mud to the station said tom

";

/// PARAGRAPH_SRT corrected: the paragraph break becomes a single line break inside the cue
pub const PARAGRAPH_CORRECTED: &str = r#"1
00:00:01,000 --> 00:00:04,000
thick with mud.
"To the station," said Tom.

"#;
