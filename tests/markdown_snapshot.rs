use wordcard::article::{Article, SentencePair, VocabEntry};
use wordcard::render::markdown::generate_markdown;

#[test]
fn markdown_document_snapshot() {
    let mut article = Article::new("Solar System", "The solar system consists of the Sun.")
        .with_difficulty("easy");
    article.translation = "太阳系由太阳组成。".to_string();
    article.vocabulary = vec![VocabEntry {
        word: "gravity".to_string(),
        pos: "n.".to_string(),
        meaning: "重力".to_string(),
        example: "Bound by gravity.".to_string(),
    }];
    article.sentences = vec![SentencePair {
        original: "The solar system consists of the Sun.".to_string(),
        translation: "太阳系由太阳组成。".to_string(),
    }];

    let md = generate_markdown(&article, "2024-05-01 12:00:00");
    insta::assert_snapshot!(md, @r"
    # Solar System

    > 生成时间: 2024-05-01 12:00:00
    > 难度: easy
    > 字数: 7

    ---

    ## 原文

    The solar system consists of the Sun.

    ---

    ## 译文

    太阳系由太阳组成。

    ---

    ## 词汇表

    | 单词 | 词性 | 释义 | 例句 |
    |------|------|------|------|
    | **gravity** | n. | 重力 | Bound by gravity. |

    ---

    ## 精彩句子

    **1.** The solar system consists of the Sun.

    > 太阳系由太阳组成。


    ---
    *Generated by WordCard*
    ");
}
