//! TTXT document rendering for chapter-marker and subtitle tracks

use crate::domain::model::{ComposedChapter, SubtitleCue};
use crate::utils::time::format_timecode;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Presentation of the chapter-marker track
///
/// Players only show the chapter names in their navigation UI, so these
/// values are fixed.
const CHAPTER_TRACK_HEADER: &str = concat!(
    r#"<TextStreamHeader width="480" height="368" layer="0" translation_x="0" translation_y="0">"#,
    "\n",
    r#"<TextSampleDescription horizontalJustification="center" verticalJustification="bottom" backColor="0 0 0 0" verticalText="no" fillTextRegion="no" continuousKaraoke="no" scroll="None">"#,
    "\n",
    r#"<FontTable>"#,
    "\n",
    r#"<FontTableEntry fontName="Arial" fontID="1"/>"#,
    "\n",
    r#"</FontTable>"#,
    "\n",
    r#"<TextBox top="0" left="0" bottom="368" right="480"/>"#,
    "\n",
    r#"<Style styles="Normal" fontID="1" fontSize="32" color="ff ff ff ff"/>"#,
    "\n",
    r#"</TextSampleDescription>"#,
    "\n",
    r#"</TextStreamHeader>"#,
);

/// Escape text for use in XML character data or attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Chapter-marker track: one named sample at each chapter's start
pub fn render_chapter_track(chapters: &[ComposedChapter]) -> String {
    let mut doc = String::new();
    doc.push_str(XML_DECLARATION);
    doc.push('\n');
    doc.push_str("<TextStream version=\"1.1\">\n");
    doc.push_str(CHAPTER_TRACK_HEADER);
    doc.push('\n');
    for chapter in chapters {
        doc.push_str(&format!(
            "<TextSample sampleTime=\"{}\">{}</TextSample>\n",
            format_timecode(chapter.start),
            escape_xml(&chapter.name)
        ));
    }
    doc.push_str("</TextStream>\n");
    doc
}

/// Subtitle track: the source header followed by re-timed cues
///
/// Cue markup was taken verbatim from a TTXT document and is written back
/// unescaped.
pub fn render_subtitle_track(header: &str, cues: &[SubtitleCue]) -> String {
    let mut lines = Vec::with_capacity(cues.len() + 4);
    lines.push(XML_DECLARATION.to_string());
    lines.push("<TextStream version=\"1.1\">".to_string());
    lines.push(header.to_string());
    for cue in cues {
        lines.push(format!(
            "<TextSample sampleTime=\"{}\" xml:space=\"preserve\">{}</TextSample>",
            format_timecode(cue.t),
            cue.x
        ));
    }
    lines.push("</TextStream>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::parse_text_track;

    fn composed(name: &str, start: f64, duration: f64) -> ComposedChapter {
        ComposedChapter {
            title: "tape".to_string(),
            chapter: 1,
            name: name.to_string(),
            start,
            duration,
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Rock & <Roll>"), "Rock &amp; &lt;Roll&gt;");
        assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
    }

    #[test]
    fn test_chapter_track_has_one_sample_per_chapter() {
        let doc = render_chapter_track(&[composed("Intro", 0.0, 30.0), composed("B & C", 30.0, 45.0)]);
        assert!(doc.contains("<TextSample sampleTime=\"00:00:00.000\">Intro</TextSample>"));
        assert!(doc.contains("<TextSample sampleTime=\"00:00:30.000\">B &amp; C</TextSample>"));
        assert!(doc.contains("fontName=\"Arial\""));
        assert!(doc.contains("fontSize=\"32\""));

        let track = parse_text_track(&doc).unwrap();
        assert_eq!(track.samples.len(), 2);
        assert_eq!(track.samples[1].time, 30.0);
    }

    #[test]
    fn test_subtitle_track_reuses_header() {
        let header = "<TextStreamHeader width=\"640\"/>";
        let cues = vec![
            SubtitleCue { t: 1.5, x: "Hi".to_string() },
            SubtitleCue { t: 61.0, x: "<Style styles=\"Bold\"/>Bye".to_string() },
        ];
        let doc = render_subtitle_track(header, &cues);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], XML_DECLARATION);
        assert_eq!(lines[1], "<TextStream version=\"1.1\">");
        assert_eq!(lines[2], header);
        assert_eq!(
            lines[3],
            "<TextSample sampleTime=\"00:00:01.500\" xml:space=\"preserve\">Hi</TextSample>"
        );
        assert_eq!(lines.last(), Some(&"</TextStream>"));

        let track = parse_text_track(&doc).unwrap();
        assert_eq!(track.samples[1].time, 61.0);
        assert_eq!(track.samples[1].markup, "<Style styles=\"Bold\"/>Bye");
    }
}
