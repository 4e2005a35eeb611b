//! Embedded builtin catalog.
//!
//! Used when no catalog file is configured or a configured file fails to
//! load. Kept as JSON so it exercises the same parsing and validation path
//! as external catalogs.

/// Builtin curriculum, JSON in the external catalog format.
pub(crate) const BUILTIN_CATALOG: &str = r#"{
  "version": 1,
  "modules": [
    {
      "id": "module1",
      "title": "Fundamentals",
      "description": "First steps with print, variables, types, lists and if.",
      "lessons": [
        {
          "id": "m1_l1",
          "title": "Print and variables",
          "key_points": [
            "print shows text on screen.",
            "Assign first, print after.",
            "Use descriptive variable names."
          ],
          "exercises": [
            {
              "id": "m1_l1_e1",
              "title": "Print a greeting",
              "statement": "Create the variable greeting with the text 'Hello, Python!' and print it.",
              "example": "message = 'Hello, class'\nprint(message)",
              "starter_code": "greeting = ''\n# print the greeting here\n",
              "accepted_vars": ["greeting", "message"],
              "hints": [
                "Assign the exact text to the variable greeting.",
                "Call print(greeting) to show it."
              ],
              "solution": "greeting = 'Hello, Python!'\nprint(greeting)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "greeting",
                  "expected": "Hello, Python!",
                  "message": "The variable greeting must contain 'Hello, Python!'."
                },
                {
                  "type": "output_contains",
                  "expected": "Hello, Python!",
                  "message": "You must print the greeting."
                }
              ]
            },
            {
              "id": "m1_l1_e2",
              "title": "Simple sum",
              "statement": "Use the variables a=2 and b=3 to compute the sum in total and print it.",
              "example": "x = 4\ny = 1\nanswer = x + y\nprint(answer)",
              "starter_code": "a = 2\nb = 3\n# compute total and show it\n",
              "accepted_vars": ["total", "answer"],
              "hints": [
                "Addition uses the + operator.",
                "Store the result in total and then print(total)."
              ],
              "solution": "a = 2\nb = 3\ntotal = a + b\nprint(total)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "total",
                  "expected": 5,
                  "message": "total must be 5."
                },
                {
                  "type": "output_contains",
                  "expected": "5",
                  "message": "Print the result of the sum."
                }
              ]
            }
          ]
        },
        {
          "id": "m1_l2",
          "title": "Basic types",
          "key_points": [
            "int and float are numeric; str is text; bool is True/False.",
            "int() and float() convert numeric text.",
            "F-strings combine text and values."
          ],
          "exercises": [
            {
              "id": "m1_l2_e1",
              "title": "Convert text to a number",
              "statement": "Convert the text '42' to an integer in the variable number.",
              "example": "data = '10'\nvalue = int(data)\nprint(value)",
              "starter_code": "text = '42'\nnumber = None\n# convert text to an integer in number\n",
              "accepted_vars": ["number", "value"],
              "hints": [
                "Use the int() function on the text.",
                "number must be an int with value 42."
              ],
              "solution": "text = '42'\nnumber = int(text)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "number",
                  "expected": 42,
                  "message": "number must be 42 (int)."
                }
              ]
            },
            {
              "id": "m1_l2_e2",
              "title": "Build a message",
              "statement": "Use name and age to build message with an f-string: 'Hello Ana, you are 21'.",
              "example": "person = 'Luis'\nyears = 30\ntext = f\"Hello {person}, you are {years}\"\nprint(text)",
              "starter_code": "name = 'Ana'\nage = 21\nmessage = ''\n# complete the message\n",
              "accepted_vars": ["message", "text"],
              "hints": [
                "Use an f-string: f\"Hello {name}, you are {age}\"",
                "Store it in message and then print message."
              ],
              "solution": "name = 'Ana'\nage = 21\nmessage = f\"Hello {name}, you are {age}\"\nprint(message)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "message",
                  "expected": "Hello Ana, you are 21",
                  "message": "message must be 'Hello Ana, you are 21'."
                },
                {
                  "type": "output_contains",
                  "expected": "Hello Ana, you are 21",
                  "message": "You must print the message."
                }
              ]
            }
          ]
        },
        {
          "id": "m1_l3",
          "title": "Basic lists",
          "key_points": [
            "Create lists with square brackets [].",
            "append adds one element at the end.",
            "len(list) gives the size."
          ],
          "exercises": [
            {
              "id": "m1_l3_e1",
              "title": "Create and extend a list",
              "statement": "Create the list fruits with 'apple' and 'pear', append 'grape' and keep it in fruits.",
              "example": "colors = ['red', 'blue']\ncolors.append('green')\nprint(colors)",
              "starter_code": "fruits = ['apple', 'pear']\n# append the new fruit here\n",
              "accepted_vars": ["fruits", "items"],
              "hints": [
                "Use fruits.append('grape').",
                "Check that the final list has three elements."
              ],
              "solution": "fruits = ['apple', 'pear']\nfruits.append('grape')\nprint(fruits)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "fruits",
                  "expected": ["apple", "pear", "grape"],
                  "message": "The list must be ['apple', 'pear', 'grape']."
                }
              ]
            }
          ]
        },
        {
          "id": "m1_l4",
          "title": "Basic if",
          "key_points": [
            "if runs only when the condition is True.",
            "Compare with ==, assign with =.",
            "Parity: num % 2 == 0."
          ],
          "exercises": [
            {
              "id": "m1_l4_e1",
              "title": "Even or odd",
              "statement": "With number = 7, create is_even with True if it is even, False if not. Print is_even.",
              "example": "n = 10\nanswer = n % 2 == 0\nprint(answer)",
              "starter_code": "number = 7\nis_even = None\n# assign True or False to is_even\n",
              "accepted_vars": ["is_even", "answer"],
              "hints": [
                "A number is even when number % 2 == 0.",
                "Store the boolean in is_even and use print."
              ],
              "solution": "number = 7\nis_even = number % 2 == 0\nprint(is_even)\n",
              "checks": [
                {
                  "type": "equals",
                  "var": "is_even",
                  "expected": false,
                  "message": "For 7, is_even must be False."
                }
              ]
            }
          ]
        }
      ]
    },
    {
      "id": "module2",
      "title": "Transformations with map",
      "description": "Using lambda and map over lists.",
      "lessons": [
        {
          "id": "m2_l1",
          "title": "lambda + map",
          "key_points": [
            "lambda defines short inline functions.",
            "map applies a function to every element of an iterable.",
            "Formula C -> F: F = C * 9 / 5 + 32."
          ],
          "exercises": [
            {
              "id": "m2_l1_e1",
              "title": "Celsius to Fahrenheit",
              "statement": "Convert the celsius list to Fahrenheit using map and lambda in the variable result.",
              "example": "values = [1, 5]\ndoubled = list(map(lambda x: x * 2, values))\nprint(doubled)",
              "starter_code": "celsius = [0, 12, 19, 21]\nresult = []\n# use map + lambda to fill result\n",
              "accepted_vars": ["result", "out"],
              "hints": [
                "Formula: F = C * 9 / 5 + 32",
                "Use result = list(map(lambda c: ..., celsius))"
              ],
              "solution": "celsius = [0, 12, 19, 21]\nresult = list(map(lambda c: c * 9 / 5 + 32, celsius))\nprint(result)\n",
              "checks": [
                {
                  "type": "list_close",
                  "var": "result",
                  "expected": [32.0, 53.6, 66.2, 69.8],
                  "message": "result must contain the correct Fahrenheit values."
                }
              ]
            }
          ]
        }
      ]
    }
  ]
}
"#;
