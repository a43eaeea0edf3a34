//! Built-in curriculum written to an empty store on first run

use super::{ContentModule, Lesson};

const NUMBERS_AND_OPERATIONS: &str = r#"# Numbers and Operations

This lesson covers the number systems and operations everything else builds on.

## Topics Covered
1. Natural Numbers
2. Integer Operations
3. Basic Arithmetic
4. Order of Operations

## Key Concepts

### Natural Numbers
The counting numbers: 1, 2, 3, 4 and so on.

### Integer Operations
Adding, subtracting, multiplying and dividing positive and negative whole numbers.

### Basic Arithmetic
- Addition (+)
- Subtraction (-)
- Multiplication (×)
- Division (÷)

### Order of Operations
PEMDAS:
1. Parentheses
2. Exponents
3. Multiplication and Division, left to right
4. Addition and Subtraction, left to right
"#;

const FRACTIONS_AND_DECIMALS: &str = r#"# Fractions and Decimals

Working with parts of a whole.

## Topics Covered
1. What are Fractions?
2. Converting Fractions to Decimals
3. Operations with Fractions
4. Real-world Applications

## Key Concepts

### Fractions
A fraction a/b names a part of a whole:
- a is the numerator
- b is the denominator

### Decimal Numbers
Decimals write parts of a whole using place value.

### Converting Between Forms
- Fractions to decimals
- Decimals to fractions
- Mixed numbers to improper fractions
"#;

const VARIABLES_AND_EXPRESSIONS: &str = r#"# Variables and Expressions

Describing quantities with symbols.

## Topics Covered
1. What are Variables?
2. Algebraic Expressions
3. Evaluating Expressions
4. Simplifying Expressions

## Key Concepts

### Variables
Symbols, usually letters, that stand for unknown values.

### Algebraic Expressions
Combinations of:
- Numbers
- Variables
- Operations
- Grouping symbols
"#;

/// The default module set, in presentation order
pub fn default_modules() -> Vec<ContentModule> {
    vec![
        ContentModule {
            id: "intro".to_string(),
            title: "Introduction to Mathematics".to_string(),
            description: "Basic concepts and foundations of mathematics".to_string(),
            lessons: vec![
                Lesson::new("lesson-1", "Numbers and Operations", NUMBERS_AND_OPERATIONS),
                Lesson::new("lesson-2", "Fractions and Decimals", FRACTIONS_AND_DECIMALS),
            ],
        },
        ContentModule {
            id: "algebra".to_string(),
            title: "Basic Algebra".to_string(),
            description: "Introduction to algebraic concepts and equations".to_string(),
            lessons: vec![
                Lesson::new("lesson-1", "Variables and Expressions", VARIABLES_AND_EXPRESSIONS),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_module_ids_are_unique() {
        let modules = default_modules();
        let ids: HashSet<_> = modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), modules.len());
        assert!(modules.iter().all(|m| !m.lessons.is_empty()));
    }
}
